use std::path::PathBuf;
use std::time::Duration;

use photobooth_core::print_job::DEFAULT_AGENT_ID;

/// Default delay between polls when the queue is empty or unreachable.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;

/// Default upper bound on one print command invocation.
pub const DEFAULT_PRINT_TIMEOUT_SECS: u64 = 120;

/// Default bound on one HTTP request to the queue or the image host.
/// Well below the server's default 300 s lease.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default print program.
pub const DEFAULT_PRINT_COMMAND: &str = "lp";

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
}

/// Printer agent configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the cloud API, without a trailing slash.
    pub cloud_base_url: String,
    /// Shared secret sent as `x-print-agent-key`.
    pub agent_key: String,
    /// Identifier sent as `x-print-agent-id`.
    pub agent_id: String,
    pub poll_interval: Duration,
    /// Upper bound on each claim, download and completion request.
    pub http_timeout: Duration,
    /// Printer passed to the print command with `-d`. `None` uses the system default.
    pub default_printer: Option<String>,
    pub print_command: String,
    pub print_timeout: Duration,
    /// Directory rendered pages are spooled into.
    pub spool_dir: PathBuf,
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default        |
    /// |----------------------|----------------|
    /// | `CLOUD_BASE_URL`     | required       |
    /// | `PRINT_AGENT_KEY`    | required       |
    /// | `PRINT_AGENT_ID`     | `agent`        |
    /// | `POLL_INTERVAL_MS`   | `1500`         |
    /// | `HTTP_TIMEOUT_SECS`  | `30`           |
    /// | `DEFAULT_PRINTER`    | unset          |
    /// | `PRINT_COMMAND`      | `lp`           |
    /// | `PRINT_TIMEOUT_SECS` | `120`          |
    /// | `SPOOL_DIR`          | OS temp dir    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_url = get("CLOUD_BASE_URL").ok_or(ConfigError::Missing {
            name: "CLOUD_BASE_URL",
        })?;
        let parsed = reqwest::Url::parse(raw_url.trim()).map_err(|e| ConfigError::Invalid {
            name: "CLOUD_BASE_URL",
            value: raw_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: "CLOUD_BASE_URL",
                value: raw_url,
                reason: "scheme must be http or https".into(),
            });
        }
        let cloud_base_url = parsed.as_str().trim_end_matches('/').to_string();

        let agent_key = get("PRINT_AGENT_KEY").ok_or(ConfigError::Missing {
            name: "PRINT_AGENT_KEY",
        })?;

        let agent_id = get("PRINT_AGENT_ID")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_AGENT_ID.to_string());

        let poll_interval_ms: u64 = parse_or(&get, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        let http_timeout_secs: u64 = parse_or(&get, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if http_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "HTTP_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        let print_timeout_secs: u64 =
            parse_or(&get, "PRINT_TIMEOUT_SECS", DEFAULT_PRINT_TIMEOUT_SECS)?;
        if print_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "PRINT_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            cloud_base_url,
            agent_key,
            agent_id,
            poll_interval: Duration::from_millis(poll_interval_ms),
            http_timeout: Duration::from_secs(http_timeout_secs),
            default_printer: get("DEFAULT_PRINTER").map(|v| v.trim().to_string()),
            print_command: get("PRINT_COMMAND").unwrap_or_else(|| DEFAULT_PRINT_COMMAND.into()),
            print_timeout: Duration::from_secs(print_timeout_secs),
            spool_dir: get("SPOOL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
        })
    }
}

fn parse_or<F, T>(get: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
