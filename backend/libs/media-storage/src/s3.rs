/// S3 storage backend
use crate::config::S3Config;
use crate::{object_path, validate_relative_path, FileStorage, MediaUpload, StorageError, StorageResult};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct S3Storage {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Storage {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Build a client from the ambient AWS environment, pinned to `config.region`
    pub async fn from_env(config: S3Config) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let client = Client::new(&aws_config);
        Self::new(Arc::new(client), config)
    }
}

#[async_trait::async_trait]
impl FileStorage for S3Storage {
    async fn store(&self, directory: &str, upload: &MediaUpload) -> StorageResult<String> {
        let key = object_path(directory, upload);

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.bytes.clone()))
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        debug!(key = %key, bucket = %self.config.bucket, "Uploaded object to S3");
        Ok(key)
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        validate_relative_path(path)?;

        // DeleteObject succeeds for missing keys
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        debug!(key = %path, bucket = %self.config.bucket, "Deleted object from S3");
        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        validate_relative_path(path)?;

        match self
            .client
            .head_object()
            .bucket(&self.config.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let not_found = e
                    .as_service_error()
                    .map(|err| err.is_not_found())
                    .unwrap_or(false);
                if not_found {
                    Ok(false)
                } else {
                    Err(StorageError::S3(e.to_string()))
                }
            }
        }
    }
}
