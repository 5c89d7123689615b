//! Print-job constants, wire types and pure validation.
//!
//! Shared by the API server (which owns the queue) and the printer agent
//! (which consumes it), so both sides agree on header names, payloads and
//! the completion vocabulary.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Header carrying the shared agent key.
pub const AGENT_KEY_HEADER: &str = "x-print-agent-key";

/// Header carrying the agent's self-reported identifier.
pub const AGENT_ID_HEADER: &str = "x-print-agent-id";

/// Agent identifier used when the agent does not send one.
pub const DEFAULT_AGENT_ID: &str = "agent";

/// Maximum length of an agent identifier.
pub const MAX_AGENT_ID_LEN: usize = 128;

/// Copies printed when the request does not specify a count.
pub const DEFAULT_COPIES: i16 = 1;

/// Upper bound on copies per print request.
pub const MAX_COPIES: i16 = 4;

/// Default claim lease in seconds. Must exceed the agent print timeout.
pub const DEFAULT_LEASE_SECS: u64 = 300;

/// Default number of claims a job may receive before an expired lease
/// becomes terminal.
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// Maximum stored length of a job error message.
pub const MAX_ERROR_MESSAGE_LEN: usize = 1000;

/// Error recorded when a claimed job's photo has no retrievable URL.
pub const ERR_MISSING_IMAGE_URL: &str = "Missing image URL";

/// Error recorded when the agent reports `error` without a message.
pub const ERR_PRINT_FAILED: &str = "Print failed";

/// Error recorded by the agent when the source image cannot be fetched.
pub const ERR_DOWNLOAD_FAILED: &str = "Failed to download image";

/// Error recorded by the agent when the image cannot be rendered.
pub const ERR_RENDER_FAILED: &str = "Failed to render image";

/// Error recorded by the agent when the print command exceeds its timeout.
pub const ERR_PRINT_TIMED_OUT: &str = "Print timed out";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Terminal outcome reported by an agent for one claimed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionOutcome {
    Done,
    Error,
}

/// Body of `POST /print-jobs/{id}/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletePrintJob {
    /// Attempt number received with the claim. Binds the report to that claim.
    pub attempt: i32,
    pub status: CompletionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Everything an agent needs to print a claimed job.
///
/// `image_url` is directly downloadable without further authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimedPrintJob {
    pub id: DbId,
    pub status: String,
    pub project_id: DbId,
    pub photo_id: DbId,
    pub copies: i16,
    /// Claim token: the job's attempt count after this claim. Echoed back on completion.
    pub attempt: i32,
    pub image_url: String,
    pub lease_expires_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Lease settings
// ---------------------------------------------------------------------------

/// Claim lease configuration applied by the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseSettings {
    /// How long a claim stays valid before another agent may reclaim the job.
    pub lease_secs: u64,
    /// Claims allowed per job; an expired lease at this count becomes `ERROR`.
    pub max_attempts: i32,
}

impl Default for LeaseSettings {
    fn default() -> Self {
        Self {
            lease_secs: DEFAULT_LEASE_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl LeaseSettings {
    /// Validate lease bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.lease_secs == 0 {
            return Err(CoreError::Validation(
                "Lease duration must be at least one second".into(),
            ));
        }
        if self.max_attempts < 1 {
            return Err(CoreError::Validation(
                "Max attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Resolve the requested copy count, defaulting to [`DEFAULT_COPIES`].
pub fn validate_copies(copies: Option<i16>) -> Result<i16, CoreError> {
    let copies = copies.unwrap_or(DEFAULT_COPIES);
    if !(1..=MAX_COPIES).contains(&copies) {
        return Err(CoreError::Validation(format!(
            "copies must be between 1 and {MAX_COPIES}"
        )));
    }
    Ok(copies)
}

/// Resolve the agent identifier from an optional header value.
///
/// A missing or blank header falls back to [`DEFAULT_AGENT_ID`].
pub fn resolve_agent_id(raw: Option<&str>) -> Result<String, CoreError> {
    let id = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_AGENT_ID.to_string()),
        Some(id) => id,
    };
    if id.len() > MAX_AGENT_ID_LEN {
        return Err(CoreError::Validation(format!(
            "Agent id must not exceed {MAX_AGENT_ID_LEN} characters"
        )));
    }
    if id.chars().any(char::is_control) {
        return Err(CoreError::Validation(
            "Agent id must not contain control characters".into(),
        ));
    }
    Ok(id.to_string())
}

/// Normalise the error message stored with a completion.
///
/// `done` clears any message. `error` keeps the reported message (trimmed
/// and truncated to [`MAX_ERROR_MESSAGE_LEN`] characters) or falls back to
/// [`ERR_PRINT_FAILED`].
pub fn completion_error_message(
    outcome: CompletionOutcome,
    reported: Option<&str>,
) -> Option<String> {
    match outcome {
        CompletionOutcome::Done => None,
        CompletionOutcome::Error => {
            let msg = reported.map(str::trim).filter(|m| !m.is_empty());
            Some(match msg {
                Some(m) => m.chars().take(MAX_ERROR_MESSAGE_LEN).collect(),
                None => ERR_PRINT_FAILED.to_string(),
            })
        }
    }
}

/// Message recorded when a lease expires on the final allowed attempt.
pub fn lease_expired_message(attempts: i32) -> String {
    format!("Lease expired after {attempts} attempts")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn copies_default_to_one() {
        assert_eq!(validate_copies(None).unwrap(), 1);
    }

    #[test]
    fn copies_outside_range_are_rejected() {
        assert_matches!(validate_copies(Some(0)), Err(CoreError::Validation(_)));
        assert_matches!(validate_copies(Some(5)), Err(CoreError::Validation(_)));
        assert_eq!(validate_copies(Some(4)).unwrap(), 4);
    }

    #[test]
    fn blank_agent_id_uses_default() {
        assert_eq!(resolve_agent_id(None).unwrap(), DEFAULT_AGENT_ID);
        assert_eq!(resolve_agent_id(Some("   ")).unwrap(), DEFAULT_AGENT_ID);
        assert_eq!(resolve_agent_id(Some(" booth-1 ")).unwrap(), "booth-1");
    }

    #[test]
    fn oversized_agent_id_is_rejected() {
        let long = "a".repeat(MAX_AGENT_ID_LEN + 1);
        assert_matches!(resolve_agent_id(Some(&long)), Err(CoreError::Validation(_)));
        assert_matches!(resolve_agent_id(Some("a\nb")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn done_clears_error_message() {
        assert_eq!(
            completion_error_message(CompletionOutcome::Done, Some("stale")),
            None
        );
    }

    #[test]
    fn error_without_message_falls_back() {
        assert_eq!(
            completion_error_message(CompletionOutcome::Error, None).as_deref(),
            Some(ERR_PRINT_FAILED)
        );
        assert_eq!(
            completion_error_message(CompletionOutcome::Error, Some("  ")).as_deref(),
            Some(ERR_PRINT_FAILED)
        );
    }

    #[test]
    fn error_message_is_truncated() {
        let long = "x".repeat(MAX_ERROR_MESSAGE_LEN + 50);
        let stored = completion_error_message(CompletionOutcome::Error, Some(&long)).unwrap();
        assert_eq!(stored.chars().count(), MAX_ERROR_MESSAGE_LEN);
    }

    #[test]
    fn outcome_wire_format_is_lowercase() {
        let body: CompletePrintJob =
            serde_json::from_str(r#"{"attempt":2,"status":"error","error_message":"Print failed"}"#)
                .unwrap();
        assert_eq!(body.status, CompletionOutcome::Error);
        assert_eq!(body.attempt, 2);
        assert_eq!(serde_json::to_value(CompletionOutcome::Done).unwrap(), "done");
        assert!(serde_json::from_str::<CompletePrintJob>(r#"{"attempt":1,"status":"DONE"}"#).is_err());
        assert!(serde_json::from_str::<CompletePrintJob>(r#"{"status":"done"}"#).is_err());
    }

    #[test]
    fn lease_settings_validation() {
        assert!(LeaseSettings::default().validate().is_ok());
        let zero = LeaseSettings {
            lease_secs: 0,
            max_attempts: 3,
        };
        assert_matches!(zero.validate(), Err(CoreError::Validation(_)));
        let none = LeaseSettings {
            lease_secs: 10,
            max_attempts: 0,
        };
        assert_matches!(none.validate(), Err(CoreError::Validation(_)));
    }
}
