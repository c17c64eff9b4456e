//! Local image backend: rasterizes the request text onto a blank canvas.

use super::{ImageGenerator, ImageOptions, ProviderError};
use crate::services::render::{Rasterizer, parse_color};
use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

/// Text-on-canvas image provider.
pub struct CanvasImageProvider {
    rasterizer: Arc<Rasterizer>,
}

impl CanvasImageProvider {
    pub fn new(rasterizer: Arc<Rasterizer>) -> Self {
        Self { rasterizer }
    }
}

/// Build a canvas of the given size and colors with `text` centered on it.
/// Unmeasurable text degenerates to a centered zero-width position.
pub(crate) fn render_canvas(
    rasterizer: &Rasterizer,
    text: &str,
    width: u32,
    height: u32,
    background_color: &str,
    text_color: &str,
) -> Result<RgbImage, ProviderError> {
    let background = parse_color(background_color).ok_or_else(|| {
        ProviderError::InvalidRequest(format!("unknown color: {}", background_color))
    })?;
    let foreground = parse_color(text_color)
        .ok_or_else(|| ProviderError::InvalidRequest(format!("unknown color: {}", text_color)))?;

    let mut canvas = RgbImage::from_pixel(width, height, background);

    let (text_width, text_height) = rasterizer.measure(text);
    let x = (width.saturating_sub(text_width) / 2) as i32;
    let y = (height.saturating_sub(text_height) / 2) as i32;
    rasterizer.draw(&mut canvas, x, y, foreground, text);

    Ok(canvas)
}

#[async_trait]
impl ImageGenerator for CanvasImageProvider {
    async fn generate(&self, text: &str, options: &ImageOptions) -> Result<Vec<u8>, ProviderError> {
        let canvas = render_canvas(
            &self.rasterizer,
            text,
            options.width,
            options.height,
            &options.background_color,
            &options.text_color,
        )?;

        let mut cursor = Cursor::new(Vec::new());
        canvas
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ProviderError::Encode(e.to_string()))?;

        tracing::debug!(
            width = options.width,
            height = options.height,
            bytes = cursor.get_ref().len(),
            "Rendered image"
        );

        Ok(cursor.into_inner())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CanvasImageProvider {
        CanvasImageProvider::new(Arc::new(Rasterizer::load(None, 40.0)))
    }

    fn options(width: u32, height: u32) -> ImageOptions {
        ImageOptions {
            width,
            height,
            background_color: "white".to_string(),
            text_color: "black".to_string(),
        }
    }

    #[tokio::test]
    async fn png_has_requested_dimensions() {
        let png = provider()
            .generate("Hello", &options(200, 100))
            .await
            .expect("generate");

        let decoded = image::load_from_memory(&png).expect("decode");
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 100);
    }

    #[tokio::test]
    async fn empty_text_still_renders() {
        let png = provider()
            .generate("", &options(64, 64))
            .await
            .expect("generate");

        let decoded = image::load_from_memory(&png).expect("decode");
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 64);
    }

    #[tokio::test]
    async fn unknown_color_is_an_error() {
        let mut opts = options(64, 64);
        opts.background_color = "not-a-color".to_string();

        let err = provider().generate("x", &opts).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }
}
