/// Errors raised while configuring storage or presigning object URLs.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A setting required by the enabled features is missing.
    #[error("Signed URLs are enabled but {0} is not set")]
    MissingSetting(&'static str),

    /// A setting could not be parsed.
    #[error("Invalid value for {name}: {message}")]
    InvalidSetting { name: &'static str, message: String },

    /// The presigning request could not be built.
    #[error("Failed to presign '{key}': {message}")]
    Presign { key: String, message: String },
}
