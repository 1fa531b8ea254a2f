use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Filesystem storage. Writes land under `base_path`; reads resolve against
/// the working directory so input files can live anywhere.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_base_dir() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested/out"));

        storage.write_file("DRM_Scores.csv", b"Pillar").await.unwrap();
        let written = std::fs::read(dir.path().join("nested/out/DRM_Scores.csv")).unwrap();
        assert_eq!(written, b"Pillar");
    }

    #[tokio::test]
    async fn test_read_uses_given_path() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("answers.txt");
        std::fs::write(&input, "Q1,Yes,1").unwrap();

        let storage = LocalStorage::new(dir.path().join("out"));
        let data = storage.read_file(input.to_str().unwrap()).await.unwrap();
        assert_eq!(data, b"Q1,Yes,1");
        assert!(storage.read_file("definitely-missing.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_relative_read_ignores_base_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("drm-petal-answers-only-in-base.txt"), "Q1,Yes,1").unwrap();

        let storage = LocalStorage::new(dir.path());
        assert!(storage.read_file("drm-petal-answers-only-in-base.txt").await.is_err());
    }
}
