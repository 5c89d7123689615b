//! S3 presigned GET URLs for photo objects.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;

use crate::config::StorageConfig;
use crate::error::StorageError;

/// Issues time-limited GET URLs for objects in the photo bucket.
#[derive(Clone)]
pub struct S3Presigner {
    client: S3Client,
    bucket: String,
    ttl: Duration,
}

impl S3Presigner {
    /// Wrap an existing client.
    pub fn new(client: S3Client, bucket: String, ttl: Duration) -> Self {
        Self {
            client,
            bucket,
            ttl,
        }
    }

    /// Build a presigner from storage settings, loading credentials from the
    /// default AWS provider chain.
    ///
    /// Path-style addressing is forced so custom endpoints work without
    /// wildcard DNS.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let bucket = config
            .bucket
            .clone()
            .ok_or(StorageError::MissingSetting("S3_BUCKET"))?;
        let region = config
            .region
            .clone()
            .ok_or(StorageError::MissingSetting("S3_REGION"))?;

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared).force_path_style(true);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = S3Client::from_conf(builder.build());
        tracing::info!(
            bucket = %bucket,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            ttl_secs = config.signed_url_ttl_secs,
            "S3 presigner configured"
        );
        Ok(Self::new(client, bucket, config.signed_url_ttl()))
    }

    /// Presign a GET for `key`.
    pub async fn presign_get(&self, key: &str) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(self.ttl).map_err(|e| StorageError::Presign {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(request.uri().to_string())
    }

    /// Bucket this presigner signs for.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}
