//! MinIO/S3-compatible storage client
//!
//! Chat messages reference attachment blobs by storage key. The blobs are
//! uploaded by the media service; this client presigns download URLs for
//! them and deletes them when their thread is deleted.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    presigned_url_expiry_secs: u32,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration.
    ///
    /// Construction is offline: the bucket is expected to exist already
    /// (it is provisioned by the media service that owns uploads).
    pub fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        Ok(Self {
            bucket,
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
        })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Generate a presigned URL for downloading an attachment blob
    ///
    /// # Arguments
    /// * `key` - The object key (path) in the bucket
    ///
    /// # Returns
    /// A presigned URL that allows temporary access to the blob
    pub async fn presigned_download_url(&self, key: &str) -> Result<String, AppError> {
        let url = self
            .bucket
            .presign_get(key, self.presigned_url_expiry_secs, None)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to generate presigned URL for '{}': {}",
                    key, e
                ))
            })?;

        Ok(url)
    }

    /// Delete an attachment blob from storage
    ///
    /// # Arguments
    /// * `key` - The object key (path) to delete
    pub async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete blob '{}': {}", key, e)))?;

        debug!(
            "Deleted blob '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(())
    }
}
