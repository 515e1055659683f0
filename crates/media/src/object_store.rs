use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::{Error, Result};

/// Blob storage for attachment bytes, keyed by slash-separated object paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()>;
    async fn get(&self, path: &str) -> Result<Vec<u8>>;
}

/// Filesystem-backed object store rooted at a directory. Object keys map
/// directly to relative paths under the root.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let traversal = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || traversal {
            return Err(Error::storage(format!("invalid object key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        tracing::debug!(path, size = bytes.len(), "object stored");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::read(&full).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (_dir, store) = store();
        store
            .put("media/image/2026/08/28/M1.jpg", b"bytes", "image/jpeg")
            .await
            .unwrap();
        let bytes = store.get("media/image/2026/08/28/M1.jpg").await.unwrap();
        assert_eq!(bytes, b"bytes");
    }

    #[tokio::test]
    async fn get_missing_object_fails() {
        let (_dir, store) = store();
        assert!(store.get("media/image/none.jpg").await.is_err());
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, store) = store();
        for key in ["../escape.jpg", "/etc/passwd", ""] {
            let err = store.put(key, b"x", "image/jpeg").await.unwrap_err();
            assert!(matches!(err, Error::Storage { .. }));
        }
    }
}
