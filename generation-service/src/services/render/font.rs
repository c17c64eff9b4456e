//! Font rasterization with a TrueType face when one is configured and a
//! built-in 8x8 bitmap face as the fallback.

use ab_glyph::{FontVec, PxScale};
use font8x8::legacy::BASIC_LEGACY;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Cell size of the fallback bitmap face.
const BITMAP_CELL: u32 = 8;

enum Face {
    Truetype(FontVec),
    Bitmap { scale: u32 },
}

/// Measures and draws text onto an RGB canvas.
pub struct Rasterizer {
    face: Face,
    size: f32,
}

impl Rasterizer {
    /// Load the face at `font_path`, falling back to the bitmap face when no
    /// path is configured or the file cannot be loaded.
    pub fn load(font_path: Option<&Path>, size: f32) -> Self {
        let size = size.max(1.0);

        if let Some(path) = font_path {
            match std::fs::read(path) {
                Ok(bytes) => match FontVec::try_from_vec(bytes) {
                    Ok(font) => {
                        tracing::info!(path = %path.display(), "Loaded TrueType font");
                        return Self {
                            face: Face::Truetype(font),
                            size,
                        };
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Invalid font file, using built-in bitmap font"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read font file, using built-in bitmap font"
                    );
                }
            }
        }

        Self {
            face: Face::Bitmap {
                scale: bitmap_scale(size),
            },
            size,
        }
    }

    /// Pixel dimensions of `text` when drawn with this face. Empty text
    /// measures as (0, 0).
    pub fn measure(&self, text: &str) -> (u32, u32) {
        if text.is_empty() {
            return (0, 0);
        }
        match &self.face {
            Face::Truetype(font) => {
                let rect = imageproc::drawing::text_size(PxScale::from(self.size), font, text);
                (rect.0, rect.1)
            }
            Face::Bitmap { scale } => {
                let cell = BITMAP_CELL * scale;
                (cell * text.chars().count() as u32, cell)
            }
        }
    }

    /// Draw `text` with its top-left corner at (x, y). Pixels outside the
    /// canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        if text.is_empty() {
            return;
        }
        match &self.face {
            Face::Truetype(font) => {
                imageproc::drawing::draw_text_mut(
                    canvas,
                    color,
                    x,
                    y,
                    PxScale::from(self.size),
                    font,
                    text,
                );
            }
            Face::Bitmap { scale } => {
                draw_bitmap_text(canvas, x, y, color, *scale, text);
            }
        }
    }
}

fn bitmap_scale(size: f32) -> u32 {
    ((size / BITMAP_CELL as f32).round() as u32).max(1)
}

fn draw_bitmap_text(
    canvas: &mut RgbImage,
    origin_x: i32,
    origin_y: i32,
    color: Rgb<u8>,
    scale: u32,
    text: &str,
) {
    let cell = (BITMAP_CELL * scale) as i32;
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);

    for (index, ch) in text.chars().enumerate() {
        let glyph = BASIC_LEGACY
            .get(ch as usize)
            .unwrap_or(&BASIC_LEGACY[b'?' as usize]);
        let glyph_x = origin_x + index as i32 * cell;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BITMAP_CELL {
                if (*bits >> col) & 1 == 0 {
                    continue;
                }
                for dy in 0..scale as i32 {
                    for dx in 0..scale as i32 {
                        let px = glyph_x + (col * scale) as i32 + dx;
                        let py = origin_y + (row as u32 * scale) as i32 + dy;
                        if px >= 0 && px < width && py >= 0 && py < height {
                            canvas.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap_rasterizer() -> Rasterizer {
        Rasterizer::load(None, 40.0)
    }

    #[test]
    fn missing_font_path_falls_back_to_bitmap() {
        let rasterizer = Rasterizer::load(Some(Path::new("/nonexistent/font.ttf")), 40.0);
        assert!(matches!(rasterizer.face, Face::Bitmap { .. }));
    }

    #[test]
    fn measure_scales_with_text_length() {
        let rasterizer = bitmap_rasterizer();
        let (w1, h1) = rasterizer.measure("a");
        let (w2, h2) = rasterizer.measure("abcd");
        assert_eq!(w2, 4 * w1);
        assert_eq!(h1, h2);
        assert!(w1 > 0 && h1 > 0);
    }

    #[test]
    fn measure_empty_text_is_zero() {
        assert_eq!(bitmap_rasterizer().measure(""), (0, 0));
    }

    #[test]
    fn draw_marks_pixels_and_clips_at_edges() {
        let rasterizer = bitmap_rasterizer();
        let mut canvas = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        rasterizer.draw(&mut canvas, 2, 2, Rgb([255, 255, 255]), "H");
        assert!(canvas.pixels().any(|p| p.0 == [255, 255, 255]));

        // Off-canvas origin must not panic.
        rasterizer.draw(&mut canvas, -1000, -1000, Rgb([255, 0, 0]), "edge");
    }
}
