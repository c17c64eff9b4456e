pub mod artifacts;
pub mod providers;
pub mod render;
pub mod video;

pub use artifacts::ArtifactStore;
