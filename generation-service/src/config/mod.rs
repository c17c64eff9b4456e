use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default TrueType point size for rendered text.
const DEFAULT_FONT_SIZE: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: core_config::Config,
    pub backends: BackendConfig,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub render: RenderConfig,
}

/// Which backend serves each operation.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub text: TextBackend,
    pub image: ImageBackend,
    pub video: VideoBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBackend {
    Gemini,
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBackend {
    Canvas,
    Imagen,
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoBackend {
    Synth,
    Veo,
    Mock,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Hosted completion model (e.g., gemini-2.0-flash)
    pub text_model: String,
    /// Hosted image model (e.g., imagen-3.0-generate-002)
    pub image_model: String,
    /// Hosted video model (e.g., veo-2)
    pub video_model: String,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Optional TrueType font; absence falls back to the built-in bitmap font.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    /// Where generated artifacts are written.
    pub artifact_dir: PathBuf,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let font_path = get_env("GATEWAY_FONT_PATH", Some(""), is_prod)?;
        let artifact_dir = get_env("GATEWAY_ARTIFACT_DIR", Some(""), is_prod)?;

        Ok(GatewayConfig {
            common: common_config,
            backends: BackendConfig {
                text: parse_backend(get_env("GATEWAY_TEXT_BACKEND", Some("gemini"), is_prod)?)?,
                image: parse_backend(get_env("GATEWAY_IMAGE_BACKEND", Some("canvas"), is_prod)?)?,
                video: parse_backend(get_env("GATEWAY_VIDEO_BACKEND", Some("synth"), is_prod)?)?,
            },
            google: GoogleConfig {
                api_key: get_env("GOOGLE_API_KEY", Some(""), is_prod)?,
            },
            models: ModelConfig {
                text_model: get_env("GATEWAY_TEXT_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                image_model: get_env(
                    "GATEWAY_IMAGE_MODEL",
                    Some("imagen-3.0-generate-002"),
                    is_prod,
                )?,
                video_model: get_env("GATEWAY_VIDEO_MODEL", Some("veo-2"), is_prod)?,
            },
            render: RenderConfig {
                font_path: if font_path.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(font_path))
                },
                font_size: get_env(
                    "GATEWAY_FONT_SIZE",
                    Some(&DEFAULT_FONT_SIZE.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_FONT_SIZE),
                artifact_dir: if artifact_dir.is_empty() {
                    env::temp_dir()
                } else {
                    PathBuf::from(artifact_dir)
                },
            },
        })
    }
}

impl FromStr for TextBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gemini" => Ok(TextBackend::Gemini),
            "mock" => Ok(TextBackend::Mock),
            other => Err(format!("unknown text backend: {}", other)),
        }
    }
}

impl FromStr for ImageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "canvas" => Ok(ImageBackend::Canvas),
            "imagen" => Ok(ImageBackend::Imagen),
            "mock" => Ok(ImageBackend::Mock),
            other => Err(format!("unknown image backend: {}", other)),
        }
    }
}

impl FromStr for VideoBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "synth" => Ok(VideoBackend::Synth),
            "veo" => Ok(VideoBackend::Veo),
            "mock" => Ok(VideoBackend::Mock),
            other => Err(format!("unknown video backend: {}", other)),
        }
    }
}

fn parse_backend<T: FromStr<Err = String>>(value: String) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
