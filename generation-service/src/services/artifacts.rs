use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Write-once store for generated media files. Each artifact gets a unique
/// name under the base directory; artifacts are retained after the response
/// is sent.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    base_path: PathBuf,
}

impl ArtifactStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    /// Reserve a unique path for a new artifact with the given extension.
    pub fn allocate(&self, extension: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", Uuid::new_v4(), extension))
    }

    /// Write a finished artifact and return its path.
    pub async fn persist(&self, extension: &str, data: &[u8]) -> Result<PathBuf, AppError> {
        let path = self.allocate(extension);
        fs::write(&path, data).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allocates_unique_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::new(dir.path()).await.expect("store");

        let a = store.allocate("png");
        let b = store.allocate("png");
        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("png"));
    }

    #[tokio::test]
    async fn persist_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::new(dir.path().join("artifacts"))
            .await
            .expect("store");

        let path = store.persist("mp4", b"data").await.expect("persist");
        assert_eq!(std::fs::read(&path).expect("read"), b"data");
    }
}
