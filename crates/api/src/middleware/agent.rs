//! Shared-key authentication extractor for printer agents.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use photobooth_core::error::CoreError;
use photobooth_core::hashing::keys_match;
use photobooth_core::print_job::{resolve_agent_id, AGENT_ID_HEADER, AGENT_KEY_HEADER};

use crate::error::AppError;
use crate::state::AppState;

/// A printer agent that presented the configured key.
///
/// Use as an extractor on the agent-only endpoints:
///
/// ```ignore
/// async fn claim(agent: PrintAgent, State(state): State<AppState>) -> AppResult<Json<()>> {
///     tracing::info!(agent_id = %agent.agent_id, "claiming");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PrintAgent {
    /// Self-reported identifier from `x-print-agent-id`, `"agent"` if absent.
    pub agent_id: String,
}

impl FromRequestParts<AppState> for PrintAgent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.print_agent_key.as_deref() else {
            tracing::warn!("Agent request rejected: PRINT_AGENT_KEY is not configured");
            return Err(unauthorized("Print agent access is not configured"));
        };

        let presented = parts
            .headers
            .get(AGENT_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing print agent key"))?;

        if !keys_match(presented, expected) {
            return Err(unauthorized("Invalid print agent key"));
        }

        let agent_id = resolve_agent_id(
            parts
                .headers
                .get(AGENT_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        )?;

        Ok(PrintAgent { agent_id })
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}
