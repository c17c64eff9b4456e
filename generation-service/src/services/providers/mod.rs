//! Generation backend abstractions and implementations.
//!
//! Each of the three operations (text, image, video) is a trait with
//! selectable backends: a hosted API, a local renderer, or a mock.

pub mod canvas;
pub mod gemini;
pub mod mock;
pub mod synth;
pub mod veo;

use async_trait::async_trait;
use service_core::error::AppError;
use std::path::Path;
use thiserror::Error;

/// Error type for backend operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Encoding error: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Generation(err.to_string())
    }
}

/// Sampling parameters for text generation.
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub max_tokens: i32,
    pub temperature: f32,
}

/// Canvas parameters for image generation.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub text_color: String,
}

/// Canvas and timing parameters for video generation.
#[derive(Debug, Clone)]
pub struct VideoOptions {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_secs: u32,
    pub background_color: String,
    pub text_color: String,
}

/// Trait for text generation backends (hosted completion API or mock).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str, options: &TextOptions) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Trait for image generation backends. Returns an encoded PNG.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for the text/prompt.
    async fn generate(&self, text: &str, options: &ImageOptions)
        -> Result<Vec<u8>, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Trait for video generation backends. Writes an MP4 to `output`.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Generate a video for the text/prompt into the given file.
    async fn generate(
        &self,
        text: &str,
        options: &VideoOptions,
        output: &Path,
    ) -> Result<(), ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
