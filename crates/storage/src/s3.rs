//! S3 media provider.

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use instabids_core::bid_card::MediaUpload;
use instabids_core::persistence::{MediaStorage, StoreError, StoreResult};

use crate::{public_url, StorageError};

/// Puts objects into one bucket. The bucket (or a CDN in front of it) must
/// be publicly readable at `public_base_url`.
#[derive(Debug, Clone)]
pub struct S3MediaStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3MediaStorage {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, public_base_url: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            public_base_url: public_base_url.to_string(),
        }
    }

    /// Load credentials from the default AWS chain and build a client.
    ///
    /// A custom `endpoint` switches to path-style addressing, which MinIO
    /// and LocalStack expect.
    pub async fn connect(
        bucket: &str,
        region: &str,
        public_base_url: &str,
        endpoint: Option<&str>,
    ) -> Result<Self, StorageError> {
        if bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket must not be empty".into()));
        }
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()));
        if let Some(url) = endpoint {
            tracing::info!(endpoint = url, "Using custom S3 endpoint");
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(endpoint.is_some())
            .build();
        Ok(Self::new(
            aws_sdk_s3::Client::from_conf(s3_config),
            bucket,
            public_base_url,
        ))
    }
}

#[async_trait]
impl MediaStorage for S3MediaStorage {
    #[tracing::instrument(skip(self, upload), fields(bucket = %self.bucket, size = upload.bytes.len()))]
    async fn upload(&self, key: &str, upload: &MediaUpload) -> StoreResult<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.bytes.clone()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(public_url(&self.public_base_url, key))
    }
}
