pub mod generate;
pub mod health;

pub use generate::{generate_image, generate_text, generate_video};
pub use health::{health_check, readiness_check};
