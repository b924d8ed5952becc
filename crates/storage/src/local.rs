//! Filesystem media provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use instabids_core::bid_card::MediaUpload;
use instabids_core::persistence::{MediaStorage, StoreError, StoreResult};

use crate::{public_url, StorageError};

/// Stores objects as files under `root`; `public_base_url` is where the
/// HTTP server exposes that directory.
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalMediaStorage {
    /// Create the root directory if needed.
    pub async fn new(root: PathBuf, public_base_url: &str) -> Result<Self, StorageError> {
        if public_base_url.trim().is_empty() {
            return Err(StorageError::Config("public base URL must not be empty".into()));
        }
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` under the root. Absolute keys and `..` are rejected.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let clean = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(&self, key: &str, upload: &MediaUpload) -> StoreResult<String> {
        let path = self.path_for(key).map_err(StoreError::backend)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::backend)?;
        }
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(StoreError::backend)?;
        tracing::debug!(path = %path.display(), size = upload.bytes.len(), "Stored media file");
        Ok(public_url(&self.public_base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn upload(bytes: &[u8]) -> MediaUpload {
        MediaUpload {
            filename: "photo.png".into(),
            content_type: "image/png".into(),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path().join("media"), "http://localhost:3000/media/")
            .await
            .unwrap();

        let url = storage
            .upload("bid-cards/owner/abc.png", &upload(b"png-bytes"))
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/media/bid-cards/owner/abc.png");
        let written = std::fs::read(storage.root().join("bid-cards/owner/abc.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn rejects_keys_that_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path().to_path_buf(), "http://x")
            .await
            .unwrap();

        for key in ["../etc/passwd", "/abs/path.png", "a/../../b.png", ""] {
            assert_matches!(storage.upload(key, &upload(b"x")).await, Err(StoreError::Backend(_)), "{key}");
        }
    }

    #[tokio::test]
    async fn empty_base_url_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = LocalMediaStorage::new(dir.path().to_path_buf(), " ").await;
        assert_matches!(result, Err(StorageError::Config(_)));
    }
}
