use crate::core::ArtifactStore;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    base_path: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// 以目前工作目錄為基準（絕對路徑不受影響）
    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

impl ArtifactStore for LocalArtifactStore {
    async fn read_artifact(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        tracing::debug!("Reading artifact: {}", full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}
