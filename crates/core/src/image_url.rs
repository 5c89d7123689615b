//! Resolution of a photo's printable image location.
//!
//! The claim protocol only hands a job to an agent once the photo's image
//! can be downloaded without further authentication. Implementations live
//! outside `core` (e.g. the S3 presigner in `photobooth-storage`).

use async_trait::async_trait;

use crate::error::CoreError;

/// Where a photo is stored.
#[derive(Debug, Clone, Copy)]
pub struct PhotoLocation<'a> {
    /// Object key in the photo bucket.
    pub storage_key: &'a str,
    /// Public URL recorded when the photo was registered, if any.
    pub public_url: Option<&'a str>,
}

/// Turns a [`PhotoLocation`] into a URL an agent can download directly.
#[async_trait]
pub trait ImageUrlResolver: Send + Sync {
    /// Return a directly downloadable URL, or `None` when the photo has no
    /// retrievable location.
    async fn resolve(&self, location: PhotoLocation<'_>) -> Result<Option<String>, CoreError>;
}
