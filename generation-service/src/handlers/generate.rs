use crate::dtos::{
    ImageGenerationRequest, TextGenerationRequest, TextGenerationResponse, VideoGenerationRequest,
};
use crate::services::providers::{ImageOptions, TextOptions, VideoOptions};
use crate::startup::AppState;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use service_core::error::AppError;
use validator::Validate;

/// Sampling temperature forwarded to the text backend.
const TEMPERATURE: f32 = 0.7;

#[tracing::instrument(skip(state, request))]
pub async fn generate_text(
    State(state): State<AppState>,
    Json(request): Json<TextGenerationRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let options = TextOptions {
        max_tokens: request.max_tokens,
        temperature: TEMPERATURE,
    };

    let generated_text = state.text.generate(&request.prompt, &options).await?;

    tracing::info!(
        prompt_len = request.prompt.len(),
        response_len = generated_text.len(),
        "Text generation completed"
    );

    Ok(Json(TextGenerationResponse { generated_text }))
}

#[tracing::instrument(skip(state, request))]
pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<ImageGenerationRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let options = ImageOptions {
        width: request.width,
        height: request.height,
        background_color: request.background_color.clone(),
        text_color: request.text_color.clone(),
    };

    let png = state.image.generate(&request.text, &options).await?;
    let path = state.artifacts.persist("png", &png).await?;

    tracing::info!(
        artifact = %path.display(),
        bytes = png.len(),
        "Image generation completed"
    );

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image.png")
        .to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        png,
    ))
}

#[tracing::instrument(skip(state, request))]
pub async fn generate_video(
    State(state): State<AppState>,
    Json(request): Json<VideoGenerationRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let options = VideoOptions {
        width: request.width,
        height: request.height,
        fps: request.fps,
        duration_secs: request.duration,
        background_color: request.background_color.clone(),
        text_color: request.text_color.clone(),
    };

    let path = state.artifacts.allocate("mp4");
    state.video.generate(&request.text, &options, &path).await?;

    // Post-condition: the backend must have produced a non-empty file.
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| AppError::Generation("Video file was not produced".to_string()))?;
    if metadata.len() == 0 {
        return Err(AppError::Generation("Video file is empty".to_string()));
    }

    let data = tokio::fs::read(&path).await?;

    tracing::info!(
        artifact = %path.display(),
        bytes = data.len(),
        "Video generation completed"
    );

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("video.mp4")
        .to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        data,
    ))
}
