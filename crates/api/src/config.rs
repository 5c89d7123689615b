use axum::http::HeaderValue;
use photobooth_core::print_job::{LeaseSettings, DEFAULT_LEASE_SECS, DEFAULT_MAX_ATTEMPTS};
use photobooth_storage::{StorageConfig, StorageError};

/// Default interval between lease reaper passes.
pub const DEFAULT_LEASE_REAPER_INTERVAL_SECS: u64 = 60;

/// Startup configuration errors. The binary logs these and exits.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },

    #[error("Invalid value for {name} ('{value}'): {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Shared secret printer agents present. `None` rejects every agent call.
    pub print_agent_key: Option<String>,
    /// Claim lease length and attempt cap.
    pub lease: LeaseSettings,
    /// Seconds between lease reaper passes.
    pub lease_reaper_interval_secs: u64,
    /// Photo bucket and URL signing.
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `PRINT_AGENT_KEY`            | unset                   |
    /// | `PRINT_LEASE_SECS`           | `300`                   |
    /// | `PRINT_MAX_ATTEMPTS`         | `3`                     |
    /// | `LEASE_REAPER_INTERVAL_SECS` | `60`                    |
    ///
    /// Storage variables are documented on [`StorageConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: "not a valid header value".into(),
                });
            }
        }

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let print_agent_key = lookup("PRINT_AGENT_KEY").filter(|k| !k.trim().is_empty());

        let lease = LeaseSettings {
            lease_secs: parse_or(&lookup, "PRINT_LEASE_SECS", DEFAULT_LEASE_SECS)?,
            max_attempts: parse_or(&lookup, "PRINT_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
        };
        lease.validate().map_err(|e| ConfigError::Invalid {
            name: "PRINT_LEASE_SECS/PRINT_MAX_ATTEMPTS",
            value: format!("{}/{}", lease.lease_secs, lease.max_attempts),
            reason: e.to_string(),
        })?;

        let lease_reaper_interval_secs: u64 = parse_or(
            &lookup,
            "LEASE_REAPER_INTERVAL_SECS",
            DEFAULT_LEASE_REAPER_INTERVAL_SECS,
        )?;
        if lease_reaper_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "LEASE_REAPER_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let storage = StorageConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            print_agent_key,
            lease,
            lease_reaper_interval_secs,
            storage,
        })
    }
}

/// Parse `name` if set, otherwise fall back to `default`.
fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
