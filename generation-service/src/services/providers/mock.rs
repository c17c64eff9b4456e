//! Mock backends for tests and keyless development.

use super::{
    ImageGenerator, ImageOptions, ProviderError, TextGenerator, TextOptions, VideoGenerator,
    VideoOptions,
};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Mock text backend.
pub struct MockTextGenerator {
    enabled: bool,
}

impl MockTextGenerator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str, options: &TextOptions) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text backend not enabled".to_string(),
            ));
        }

        let _ = options;
        Ok(format!("Mock response for: {}", prompt))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text backend not enabled".to_string(),
            ))
        }
    }
}

/// Mock image backend. Produces a real PNG of the requested size so
/// dimension checks hold even against mocks.
pub struct MockImageGenerator {
    enabled: bool,
}

impl MockImageGenerator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(
        &self,
        _text: &str,
        options: &ImageOptions,
    ) -> Result<Vec<u8>, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock image backend not enabled".to_string(),
            ));
        }

        let canvas = RgbImage::from_pixel(options.width, options.height, Rgb([128, 128, 128]));
        let mut cursor = Cursor::new(Vec::new());
        canvas
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ProviderError::Encode(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock image backend not enabled".to_string(),
            ))
        }
    }
}

/// Mock video backend. Writes placeholder bytes to the output path.
pub struct MockVideoGenerator {
    enabled: bool,
}

impl MockVideoGenerator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl VideoGenerator for MockVideoGenerator {
    async fn generate(
        &self,
        _text: &str,
        _options: &VideoOptions,
        output: &Path,
    ) -> Result<(), ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock video backend not enabled".to_string(),
            ));
        }

        tokio::fs::write(output, vec![0u8; 4096]).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock video backend not enabled".to_string(),
            ))
        }
    }
}
