//! Project slug validation and photo URL helpers.

use crate::error::CoreError;

/// Maximum length of a project slug.
const MAX_SLUG_LEN: usize = 64;

/// Maximum length of a photo storage key.
const MAX_STORAGE_KEY_LEN: usize = 512;

/// Validate a project slug.
///
/// Rules:
/// - Must not be empty or exceed `MAX_SLUG_LEN` characters.
/// - Lowercase ASCII letters, digits and hyphens only.
/// - Must not start or end with a hyphen.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Project slug must be 1-{MAX_SLUG_LEN} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Project slug may only contain lowercase letters, digits and hyphens".into(),
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(CoreError::Validation(
            "Project slug must not start or end with a hyphen".into(),
        ));
    }
    Ok(())
}

/// Validate an object storage key for a registered photo.
pub fn validate_storage_key(key: &str) -> Result<(), CoreError> {
    if key.trim().is_empty() {
        return Err(CoreError::Validation("storage_key must not be empty".into()));
    }
    if key.len() > MAX_STORAGE_KEY_LEN {
        return Err(CoreError::Validation(format!(
            "storage_key must not exceed {MAX_STORAGE_KEY_LEN} characters"
        )));
    }
    if key.starts_with('/') || key.split('/').any(|part| part == "..") {
        return Err(CoreError::Validation(
            "storage_key must be a relative key without '..' segments".into(),
        ));
    }
    Ok(())
}

/// Build the public URL of a stored object from a configured base URL.
///
/// Returns `None` when no public base URL is configured.
pub fn public_url_for(base_url: Option<&str>, key: &str) -> Option<String> {
    let base = base_url?.trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    Some(format!("{base}/{key}"))
}
