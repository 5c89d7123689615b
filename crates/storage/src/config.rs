use std::time::Duration;

use crate::error::StorageError;

/// Default lifetime of a presigned GET URL.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 300;

/// Photo bucket settings.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Bucket holding uploaded photos.
    pub bucket: Option<String>,
    /// Bucket region.
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...).
    pub endpoint: Option<String>,
    /// Base URL under which objects are publicly readable, if any.
    pub public_base_url: Option<String>,
    /// Presign GET URLs for photos without a public URL.
    pub signed_urls_enabled: bool,
    /// Lifetime of presigned URLs in seconds.
    pub signed_url_ttl_secs: u64,
}

impl StorageConfig {
    /// Load storage settings from the process environment.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `S3_BUCKET`           | unset   |
    /// | `S3_REGION`           | unset   |
    /// | `S3_ENDPOINT`         | unset   |
    /// | `S3_PUBLIC_BASE_URL`  | unset   |
    /// | `SIGNED_URLS_ENABLED` | `false` |
    /// | `SIGNED_URL_TTL_SECS` | `300`   |
    ///
    /// Bucket and region are required when signed URLs are enabled.
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load storage settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let signed_urls_enabled = match non_empty("SIGNED_URLS_ENABLED") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| StorageError::InvalidSetting {
                name: "SIGNED_URLS_ENABLED",
                message: format!("expected true or false, got '{v}'"),
            })?,
        };

        let signed_url_ttl_secs = match non_empty("SIGNED_URL_TTL_SECS") {
            None => DEFAULT_SIGNED_URL_TTL_SECS,
            Some(v) => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(StorageError::InvalidSetting {
                        name: "SIGNED_URL_TTL_SECS",
                        message: format!("expected a positive number of seconds, got '{v}'"),
                    })
                }
            },
        };

        let config = Self {
            bucket: non_empty("S3_BUCKET"),
            region: non_empty("S3_REGION"),
            endpoint: non_empty("S3_ENDPOINT"),
            public_base_url: non_empty("S3_PUBLIC_BASE_URL"),
            signed_urls_enabled,
            signed_url_ttl_secs,
        };

        if config.signed_urls_enabled {
            if config.bucket.is_none() {
                return Err(StorageError::MissingSetting("S3_BUCKET"));
            }
            if config.region.is_none() {
                return Err(StorageError::MissingSetting("S3_REGION"));
            }
        }

        Ok(config)
    }

    /// Presigned URL lifetime.
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
