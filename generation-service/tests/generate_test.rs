//! Endpoint tests for the three generation operations, driven through the
//! router with local backends only.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use generation_service::config::{
    BackendConfig, GatewayConfig, GoogleConfig, ImageBackend, ModelConfig, RenderConfig,
    TextBackend, VideoBackend,
};
use generation_service::services::ArtifactStore;
use generation_service::services::providers::canvas::CanvasImageProvider;
use generation_service::services::providers::mock::{MockTextGenerator, MockVideoGenerator};
use generation_service::services::providers::synth::FrameSynthVideoProvider;
use generation_service::services::render::Rasterizer;
use generation_service::startup::{AppState, router};
use http_body_util::BodyExt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn test_config(artifact_dir: &Path) -> GatewayConfig {
    GatewayConfig {
        common: service_core::config::Config {
            port: 0,
            log_level: "info".to_string(),
        },
        backends: BackendConfig {
            text: TextBackend::Mock,
            image: ImageBackend::Canvas,
            video: VideoBackend::Synth,
        },
        google: GoogleConfig {
            api_key: String::new(),
        },
        models: ModelConfig {
            text_model: "gemini-2.0-flash".to_string(),
            image_model: "imagen-3.0-generate-002".to_string(),
            video_model: "veo-2".to_string(),
        },
        render: RenderConfig {
            font_path: None,
            font_size: 40.0,
            artifact_dir: artifact_dir.to_path_buf(),
        },
    }
}

async fn test_state(artifact_dir: &Path) -> AppState {
    let rasterizer = Arc::new(Rasterizer::load(None, 40.0));
    AppState {
        config: test_config(artifact_dir),
        text: Arc::new(MockTextGenerator::new(true)),
        image: Arc::new(CanvasImageProvider::new(rasterizer.clone())),
        video: Arc::new(FrameSynthVideoProvider::new(rasterizer)),
        artifacts: ArtifactStore::new(artifact_dir)
            .await
            .expect("artifact store"),
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn text_generation_returns_generated_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(test_state(dir.path()).await);

    let response = app
        .oneshot(post_json("/generate/text", r#"{"prompt": "hello"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).expect("json");
    let generated = body["generated_text"].as_str().expect("string");
    assert!(!generated.is_empty());
}

#[tokio::test]
async fn empty_prompt_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(test_state(dir.path()).await);

    let response = app
        .oneshot(post_json("/generate/text", r#"{"prompt": ""}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn image_generation_matches_requested_dimensions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(test_state(dir.path()).await);

    let response = app
        .oneshot(post_json(
            "/generate/image",
            r#"{"text": "Hello", "width": 200, "height": 100}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/png")
    );

    let png = body_bytes(response).await;
    let decoded = image::load_from_memory(&png).expect("decode png");
    assert_eq!(decoded.width(), 200);
    assert_eq!(decoded.height(), 100);
}

#[tokio::test]
async fn image_generation_handles_empty_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(test_state(dir.path()).await);

    let response = app
        .oneshot(post_json(
            "/generate/image",
            r#"{"text": "", "width": 64, "height": 64}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let png = body_bytes(response).await;
    assert!(image::load_from_memory(&png).is_ok());
}

#[tokio::test]
async fn video_generation_writes_duration_times_fps_frames() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(test_state(dir.path()).await);

    let response = app
        .oneshot(post_json(
            "/generate/video",
            r#"{"text": "Hi", "duration": 2, "fps": 10, "width": 64, "height": 64}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("video/mp4")
    );

    let data = body_bytes(response).await;
    let size = data.len() as u64;
    let reader = mp4::Mp4Reader::read_header(Cursor::new(data), size).expect("read mp4");
    let track = reader.tracks().values().next().expect("video track");
    assert_eq!(track.sample_count(), 20);
}

#[tokio::test]
async fn oversize_video_request_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(test_state(dir.path()).await);

    let response = app
        .oneshot(post_json(
            "/generate/video",
            r#"{"text": "x", "duration": 65536, "fps": 65536}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn backend_failure_yields_500_with_detail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut state = test_state(dir.path()).await;
    state.text = Arc::new(MockTextGenerator::new(false));
    let app = router(state);

    let response = app
        .oneshot(post_json("/generate/text", r#"{"prompt": "hello"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).expect("json");
    let detail = body["detail"].as_str().expect("detail");
    assert!(!detail.is_empty());
}

#[tokio::test]
async fn failed_video_backend_never_returns_a_partial_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut state = test_state(dir.path()).await;
    state.video = Arc::new(MockVideoGenerator::new(false));
    let app = router(state);

    let response = app
        .oneshot(post_json("/generate/video", r#"{"text": "Hi"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert!(!body["detail"].as_str().expect("detail").is_empty());
}
