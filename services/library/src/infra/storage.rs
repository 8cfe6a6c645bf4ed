use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;
use bytes::Bytes;

use crate::domain::repository::FileStorage;
use crate::error::LibraryError;

/// Stores uploads under a root directory; the same tree is served at `/media`.
#[derive(Clone)]
pub struct LocalFileStorage {
    pub root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, LibraryError> {
        let relative = Path::new(path);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !plain {
            return Err(LibraryError::validation("file", "invalid storage path"));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStorage for LocalFileStorage {
    async fn save(&self, path: &str, bytes: Bytes) -> Result<(), LibraryError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create media dir {}", parent.display()))?;
        }
        tokio::fs::write(&full, &bytes)
            .await
            .with_context(|| format!("write media file {}", full.display()))?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), LibraryError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove media file {}", full.display()))
                .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_write_nested_file_and_remove_it() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());
        storage
            .save("books/dune/chapters/one.txt", Bytes::from_static(b"spice"))
            .await
            .unwrap();
        let full = dir.path().join("books/dune/chapters/one.txt");
        assert_eq!(tokio::fs::read(&full).await.unwrap(), b"spice");

        storage.remove("books/dune/chapters/one.txt").await.unwrap();
        assert!(!full.exists());
    }

    #[tokio::test]
    async fn should_ignore_missing_file_on_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());
        assert!(storage.remove("authors/nobody.png").await.is_ok());
    }

    #[tokio::test]
    async fn should_reject_paths_escaping_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());
        let err = storage
            .save("../outside.txt", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "VALIDATION");
        assert!(storage.remove("/etc/passwd").await.is_err());
    }
}
