use crate::startup::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "generation-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: all configured backends must pass their health check.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let checks = tokio::join!(
        state.text.health_check(),
        state.image.health_check(),
        state.video.health_check(),
    );

    match checks {
        (Ok(()), Ok(()), Ok(())) => StatusCode::OK,
        (text, image, video) => {
            for (backend, result) in [("text", &text), ("image", &image), ("video", &video)] {
                if let Err(e) = result {
                    tracing::warn!(backend, error = %e, "Backend not ready");
                }
            }
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
