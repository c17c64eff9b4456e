//! Veo video generation provider.
//!
//! Veo runs as a long-running operation: start the generation, poll the
//! operation until it completes, then download the first generated sample.

use super::{ProviderError, VideoGenerator, VideoOptions};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Generative Language API base URL.
const VEO_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Seconds between operation polls.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll budget; a stuck operation fails the request once exhausted.
const MAX_POLLS: u32 = 60;

/// Veo provider configuration.
#[derive(Debug, Clone)]
pub struct VeoConfig {
    pub api_key: String,
    pub model: String,
}

/// Veo video provider.
pub struct VeoVideoProvider {
    config: VeoConfig,
    client: Client,
}

impl VeoVideoProvider {
    pub fn new(config: VeoConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self { config, client })
    }

    async fn start_operation(
        &self,
        text: &str,
        options: &VideoOptions,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:predictLongRunning?key={}",
            VEO_API_BASE, self.config.model, self.config.api_key
        );

        let request = StartRequest {
            instances: vec![StartInstance {
                prompt: text.to_string(),
            }],
            parameters: StartParameters {
                duration_seconds: options.duration_secs as i32,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Veo API error {}: {}",
                status, error_text
            )));
        }

        let operation: OperationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        operation
            .name
            .ok_or_else(|| ProviderError::ApiError("No operation name returned".to_string()))
    }

    async fn poll_operation(&self, name: &str) -> Result<GeneratedVideo, ProviderError> {
        let url = format!("{}/{}?key={}", VEO_API_BASE, name, self.config.api_key);

        for _ in 0..MAX_POLLS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let operation: OperationResponse = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| ProviderError::NetworkError(e.to_string()))?
                .json()
                .await
                .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

            if let Some(error) = operation.error {
                return Err(ProviderError::ApiError(format!(
                    "Video generation failed: {}",
                    error.message
                )));
            }

            if !operation.done {
                tracing::debug!(operation = name, "Video generation still running");
                continue;
            }

            return operation
                .response
                .and_then(|r| r.generate_video_response)
                .and_then(|r| r.generated_samples.into_iter().next())
                .map(|s| s.video)
                .ok_or_else(|| {
                    ProviderError::ApiError("No video artifact returned".to_string())
                });
        }

        Err(ProviderError::ApiError(
            "Video generation did not complete within the poll budget".to_string(),
        ))
    }

    async fn fetch_video(&self, video: GeneratedVideo) -> Result<Vec<u8>, ProviderError> {
        if let Some(encoded) = video.bytes_base64_encoded {
            return base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| ProviderError::ApiError(format!("Invalid video payload: {}", e)));
        }

        let uri = video
            .uri
            .ok_or_else(|| ProviderError::ApiError("No video artifact returned".to_string()))?;
        let separator = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{}{}key={}", uri, separator, self.config.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Video download failed: {}",
                response.status()
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;
        Ok(data.to_vec())
    }
}

#[async_trait]
impl VideoGenerator for VeoVideoProvider {
    async fn generate(
        &self,
        text: &str,
        options: &VideoOptions,
        output: &Path,
    ) -> Result<(), ProviderError> {
        tracing::debug!(
            model = %self.config.model,
            prompt_len = text.len(),
            duration = options.duration_secs,
            "Starting Veo video generation"
        );

        let name = self.start_operation(text, options).await?;
        let video = self.poll_operation(&name).await?;
        let data = self.fetch_video(video).await?;

        tokio::fs::write(output, &data).await?;

        tracing::info!(
            operation = %name,
            bytes = data.len(),
            output = %output.display(),
            "Veo video generation completed"
        );

        Ok(())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            Err(ProviderError::NotConfigured(
                "Veo API key not configured".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Veo API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct StartRequest {
    instances: Vec<StartInstance>,
    parameters: StartParameters,
}

#[derive(Debug, Serialize)]
struct StartInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartParameters {
    duration_seconds: i32,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<OperationResult>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: GeneratedVideo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedVideo {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}
