//! Application startup and lifecycle management.

use crate::config::{GatewayConfig, ImageBackend, TextBackend, VideoBackend};
use crate::handlers;
use crate::services::ArtifactStore;
use crate::services::providers::canvas::CanvasImageProvider;
use crate::services::providers::gemini::{GeminiConfig, GeminiImageProvider, GeminiTextProvider};
use crate::services::providers::mock::{MockImageGenerator, MockTextGenerator, MockVideoGenerator};
use crate::services::providers::synth::FrameSynthVideoProvider;
use crate::services::providers::veo::{VeoConfig, VeoVideoProvider};
use crate::services::providers::{ImageGenerator, TextGenerator, VideoGenerator};
use crate::services::render::Rasterizer;
use axum::{
    Router,
    routing::{get, post},
};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state. Backend handles are constructed once at
/// startup and injected into each handler.
#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub video: Arc<dyn VideoGenerator>,
    pub artifacts: ArtifactStore,
}

/// Build the gateway router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/generate/text", post(handlers::generate_text))
        .route("/generate/image", post(handlers::generate_image))
        .route("/generate/video", post(handlers::generate_video))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let rasterizer = Arc::new(Rasterizer::load(
            config.render.font_path.as_deref(),
            config.render.font_size,
        ));

        let google = |model: &str| GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: model.to_string(),
        };

        let text: Arc<dyn TextGenerator> = match config.backends.text {
            TextBackend::Gemini => Arc::new(
                GeminiTextProvider::new(google(&config.models.text_model))
                    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?,
            ),
            TextBackend::Mock => Arc::new(MockTextGenerator::new(true)),
        };

        let image: Arc<dyn ImageGenerator> = match config.backends.image {
            ImageBackend::Canvas => Arc::new(CanvasImageProvider::new(rasterizer.clone())),
            ImageBackend::Imagen => Arc::new(
                GeminiImageProvider::new(google(&config.models.image_model))
                    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?,
            ),
            ImageBackend::Mock => Arc::new(MockImageGenerator::new(true)),
        };

        let video: Arc<dyn VideoGenerator> = match config.backends.video {
            VideoBackend::Synth => Arc::new(FrameSynthVideoProvider::new(rasterizer.clone())),
            VideoBackend::Veo => Arc::new(
                VeoVideoProvider::new(VeoConfig {
                    api_key: config.google.api_key.clone(),
                    model: config.models.video_model.clone(),
                })
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?,
            ),
            VideoBackend::Mock => Arc::new(MockVideoGenerator::new(true)),
        };

        tracing::info!(
            text = ?config.backends.text,
            image = ?config.backends.image,
            video = ?config.backends.video,
            "Initialized generation backends"
        );

        let artifacts = ArtifactStore::new(&config.render.artifact_dir)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to initialize artifact store at {}: {}",
                    config.render.artifact_dir.display(),
                    e
                );
                e
            })?;

        let state = AppState {
            config: config.clone(),
            text,
            image,
            video,
            artifacts,
        };

        // Bind the listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
