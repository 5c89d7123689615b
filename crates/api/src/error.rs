//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": "...", "code": "..."}`. The
//! booth UI and the printer agent branch on `code`; `error` is for humans.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use photobooth_core::error::CoreError;
use serde::Serialize;

/// Error returned by handlers and the print queue service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A print was requested for a project whose printing switch is off.
    #[error("Printing is disabled for project '{slug}'")]
    PrintingDisabled { slug: String },
}

pub type AppResult<T> = Result<T, AppError>;

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl ErrorBody {
    fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }

    /// Sanitized 500 body. Details go to the log, never to the client.
    pub fn internal() -> Self {
        Self::new("INTERNAL_ERROR", INTERNAL_MESSAGE)
    }
}

impl AppError {
    /// Status and body for this error. Server-side failures are logged here.
    fn to_parts(&self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => database_parts(err),
            AppError::PrintingDisabled { slug } => {
                tracing::debug!(project = %slug, "Print request for disabled project");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("PRINTING_DISABLED", "Printing is disabled for this project"),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_parts();
        (status, Json(body)).into_response()
    }
}

fn core_parts(err: &CoreError) -> (StatusCode, ErrorBody) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", format!("{entity} with id {id} not found")),
        ),
        CoreError::NotFoundByKey { entity, key } => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", format!("{entity} '{key}' not found")),
        ),
        CoreError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("VALIDATION_ERROR", msg.as_str()),
        ),
        // A completion that lost its claim. The agent logs it and moves on.
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::new("CONFLICT", msg.as_str())),
        CoreError::Unauthorized(msg) => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("UNAUTHORIZED", msg.as_str()),
        ),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
    }
}

/// Postgres error classes the queue can hit under concurrent edits.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn database_parts(err: &sqlx::Error) -> (StatusCode, ErrorBody) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", "Resource not found"),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                return (
                    StatusCode::CONFLICT,
                    ErrorBody::new(
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    ),
                );
            }
            // The photo or project was deleted between lookup and insert.
            Some(FOREIGN_KEY_VIOLATION) => {
                tracing::warn!(constraint, "Referenced row vanished during write");
                return (
                    StatusCode::NOT_FOUND,
                    ErrorBody::new("NOT_FOUND", "Referenced photo or project no longer exists"),
                );
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "Database error");
    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
}
