//! Media storage providers for bid card attachments.
//!
//! Two providers implement `instabids_core::persistence::MediaStorage`:
//! [`LocalMediaStorage`] writes under a directory served as static files,
//! [`S3MediaStorage`] puts objects into a public-read bucket. Which one runs
//! is chosen by [`MediaStorageConfig`] at startup.

use std::path::PathBuf;
use std::sync::Arc;

use instabids_core::persistence::MediaStorage;

pub mod local;
pub mod s3;

pub use local::LocalMediaStorage;
pub use s3::S3MediaStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage configuration: {0}")]
    Config(String),

    #[error("Invalid object key '{0}'")]
    InvalidKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which provider to build, with its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaStorageConfig {
    Local {
        root: PathBuf,
        public_base_url: String,
    },
    S3 {
        bucket: String,
        region: String,
        public_base_url: String,
        /// Custom endpoint for S3-compatible stores (MinIO, LocalStack).
        endpoint: Option<String>,
    },
}

impl MediaStorageConfig {
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::S3 { .. } => "s3",
        }
    }
}

/// Build the configured provider.
pub async fn build(config: &MediaStorageConfig) -> Result<Arc<dyn MediaStorage>, StorageError> {
    let storage: Arc<dyn MediaStorage> = match config {
        MediaStorageConfig::Local {
            root,
            public_base_url,
        } => Arc::new(LocalMediaStorage::new(root.clone(), public_base_url).await?),
        MediaStorageConfig::S3 {
            bucket,
            region,
            public_base_url,
            endpoint,
        } => Arc::new(
            S3MediaStorage::connect(bucket, region, public_base_url, endpoint.as_deref()).await?,
        ),
    };
    tracing::info!(provider = config.provider_name(), "Media storage ready");
    Ok(storage)
}

/// Join a base URL and an object key with exactly one slash.
pub(crate) fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
