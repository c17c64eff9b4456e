//! Google AI provider implementations: Gemini text completion and Imagen
//! image generation.

use super::{ImageGenerator, ImageOptions, ProviderError, TextGenerator, TextOptions};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Generative Language API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Shared provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

fn build_client() -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .map_err(|e| ProviderError::NetworkError(e.to_string()))
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            config,
            client: build_client()?,
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            GEMINI_API_BASE, self.config.model, method, self.config.api_key
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiTextProvider {
    async fn generate(&self, prompt: &str, options: &TextOptions) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(options.temperature),
                max_output_tokens: Some(options.max_tokens),
            }),
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            max_tokens = options.max_tokens,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
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
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let candidate = api_response
            .candidates
            .first()
            .ok_or_else(|| ProviderError::ApiError("No candidates in response".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ProviderError::ContentFiltered);
        }

        candidate
            .content
            .parts
            .first()
            .map(|p| p.text.clone())
            .ok_or_else(|| ProviderError::ApiError("No text in response".to_string()))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        check_api_key(&self.client, &self.config.api_key).await
    }
}

/// Imagen image provider. Persists the first returned artifact.
pub struct GeminiImageProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiImageProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            config,
            client: build_client()?,
        })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:predict?key={}",
            GEMINI_API_BASE, self.config.model, self.config.api_key
        )
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageProvider {
    async fn generate(
        &self,
        text: &str,
        _options: &ImageOptions,
    ) -> Result<Vec<u8>, ProviderError> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: text.to_string(),
            }],
            parameters: PredictParameters { sample_count: 1 },
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = text.len(),
            "Sending request to Imagen API"
        );

        let response = self
            .client
            .post(self.api_url())
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
                "Imagen API error {}: {}",
                status, error_text
            )));
        }

        let api_response: PredictResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let prediction = api_response
            .predictions
            .first()
            .ok_or_else(|| ProviderError::ApiError("No image artifact returned".to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(&prediction.bytes_base64_encoded)
            .map_err(|e| ProviderError::ApiError(format!("Invalid image payload: {}", e)))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        check_api_key(&self.client, &self.config.api_key).await
    }
}

/// Verify the API key by listing models.
async fn check_api_key(client: &Client, api_key: &str) -> Result<(), ProviderError> {
    if api_key.is_empty() {
        return Err(ProviderError::NotConfigured(
            "Google API key not configured".to_string(),
        ));
    }

    let url = format!("{}/models?key={}", GEMINI_API_BASE, api_key);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(ProviderError::ApiError(format!(
            "Health check failed: {}",
            response.status()
        )))
    }
}

// ============================================================================
// Google API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: i32,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: String,
}
