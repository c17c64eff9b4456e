//! Request and response payloads for the generation endpoints. Each request
//! is an ephemeral value object, constructed per call and discarded after
//! the response is sent.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct TextGenerationRequest {
    #[validate(length(min = 1, message = "Prompt cannot be empty"))]
    pub prompt: String,
    #[serde(default = "default_max_tokens")]
    #[validate(range(min = 1, message = "max_tokens must be positive"))]
    pub max_tokens: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextGenerationResponse {
    pub generated_text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ImageGenerationRequest {
    /// Text to rasterize (local backend) or prompt (hosted backend).
    #[serde(alias = "prompt")]
    pub text: String,
    #[serde(default = "default_image_dimension")]
    #[validate(range(min = 1, max = 4096, message = "width must be between 1 and 4096"))]
    pub width: u32,
    #[serde(default = "default_image_dimension")]
    #[validate(range(min = 1, max = 4096, message = "height must be between 1 and 4096"))]
    pub height: u32,
    #[serde(default = "default_image_background")]
    pub background_color: String,
    #[serde(default = "default_image_text_color")]
    pub text_color: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VideoGenerationRequest {
    pub text: String,
    /// Seconds of video to produce.
    #[serde(default = "default_duration")]
    #[validate(range(min = 1, max = 300, message = "duration must be between 1 and 300"))]
    pub duration: u32,
    #[serde(default = "default_video_width")]
    #[validate(range(min = 1, max = 4096, message = "width must be between 1 and 4096"))]
    pub width: u32,
    #[serde(default = "default_video_height")]
    #[validate(range(min = 1, max = 4096, message = "height must be between 1 and 4096"))]
    pub height: u32,
    #[serde(default = "default_fps")]
    #[validate(range(min = 1, max = 120, message = "fps must be between 1 and 120"))]
    pub fps: u32,
    #[serde(default = "default_video_background")]
    pub background_color: String,
    #[serde(default = "default_video_text_color")]
    pub text_color: String,
}

fn default_max_tokens() -> i32 {
    100
}

fn default_image_dimension() -> u32 {
    512
}

fn default_duration() -> u32 {
    10
}

fn default_video_width() -> u32 {
    640
}

fn default_video_height() -> u32 {
    480
}

fn default_fps() -> u32 {
    24
}

fn default_image_background() -> String {
    "white".to_string()
}

fn default_image_text_color() -> String {
    "black".to_string()
}

fn default_video_background() -> String {
    "black".to_string()
}

fn default_video_text_color() -> String {
    "white".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_applies_default_max_tokens() {
        let request: TextGenerationRequest =
            serde_json::from_str(r#"{"prompt": "hello"}"#).expect("deserialize");
        assert_eq!(request.max_tokens, 100);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_prompt_fails_validation() {
        let request: TextGenerationRequest =
            serde_json::from_str(r#"{"prompt": ""}"#).expect("deserialize");
        assert!(request.validate().is_err());
    }

    #[test]
    fn zero_max_tokens_fails_validation() {
        let request: TextGenerationRequest =
            serde_json::from_str(r#"{"prompt": "x", "max_tokens": 0}"#).expect("deserialize");
        assert!(request.validate().is_err());
    }

    #[test]
    fn image_request_accepts_prompt_alias_and_defaults() {
        let request: ImageGenerationRequest =
            serde_json::from_str(r#"{"prompt": "a cat"}"#).expect("deserialize");
        assert_eq!(request.text, "a cat");
        assert_eq!(request.width, 512);
        assert_eq!(request.height, 512);
        assert_eq!(request.background_color, "white");
        assert_eq!(request.text_color, "black");
    }

    #[test]
    fn image_request_allows_empty_text() {
        let request: ImageGenerationRequest =
            serde_json::from_str(r#"{"text": ""}"#).expect("deserialize");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn video_request_applies_defaults() {
        let request: VideoGenerationRequest =
            serde_json::from_str(r#"{"text": "hi"}"#).expect("deserialize");
        assert_eq!(request.duration, 10);
        assert_eq!(request.fps, 24);
        assert_eq!(request.width, 640);
        assert_eq!(request.height, 480);
        assert_eq!(request.background_color, "black");
        assert_eq!(request.text_color, "white");
    }

    #[test]
    fn zero_duration_fails_validation() {
        let request: VideoGenerationRequest =
            serde_json::from_str(r#"{"text": "hi", "duration": 0}"#).expect("deserialize");
        assert!(request.validate().is_err());
    }

    #[test]
    fn oversize_video_parameters_fail_validation() {
        let request: VideoGenerationRequest =
            serde_json::from_str(r#"{"text": "hi", "duration": 65536, "fps": 65536}"#)
                .expect("deserialize");
        assert!(request.validate().is_err());
    }

    #[test]
    fn oversize_image_dimensions_fail_validation() {
        let request: ImageGenerationRequest =
            serde_json::from_str(r#"{"text": "hi", "width": 100000}"#).expect("deserialize");
        assert!(request.validate().is_err());
    }
}
