use async_trait::async_trait;
use photobooth_core::error::CoreError;
use photobooth_core::image_url::{ImageUrlResolver, PhotoLocation};

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::presign::S3Presigner;

/// Resolves a photo to a downloadable URL.
///
/// Order: the public URL stored with the photo, then a presigned GET when
/// signing is enabled, otherwise nothing.
#[derive(Clone, Default)]
pub struct PhotoUrlResolver {
    presigner: Option<S3Presigner>,
}

impl PhotoUrlResolver {
    /// Resolver that only hands out stored public URLs.
    pub fn public_only() -> Self {
        Self { presigner: None }
    }

    /// Resolver that falls back to presigned URLs.
    pub fn with_presigner(presigner: S3Presigner) -> Self {
        Self {
            presigner: Some(presigner),
        }
    }

    /// Build the resolver the configuration asks for.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        if !config.signed_urls_enabled {
            return Ok(Self::public_only());
        }
        Ok(Self::with_presigner(S3Presigner::from_config(config).await?))
    }
}

#[async_trait]
impl ImageUrlResolver for PhotoUrlResolver {
    async fn resolve(&self, location: PhotoLocation<'_>) -> Result<Option<String>, CoreError> {
        if let Some(url) = location.public_url.filter(|u| !u.trim().is_empty()) {
            return Ok(Some(url.to_string()));
        }

        let Some(presigner) = &self.presigner else {
            return Ok(None);
        };

        presigner
            .presign_get(location.storage_key)
            .await
            .map(Some)
            .map_err(|e| CoreError::Internal(e.to_string()))
    }
}
