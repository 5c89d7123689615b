//! Agent error types.
//!
//! Everything that can go wrong between claiming a job and reporting its
//! outcome. None of these stop the poll loop; they are logged and, once a
//! job is claimed, turned into an `error` completion.

use std::time::Duration;

/// Errors raised by the queue client, renderer and printer driver.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The queue returned a non-2xx status code.
    #[error("Queue API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The source image could not be fetched.
    #[error("Image download failed: {0}")]
    Download(String),

    /// The image could not be decoded or the print page could not be written.
    #[error("Render failed: {0}")]
    Render(String),

    /// The print command could not be started or exited non-zero.
    #[error("Print command failed: {0}")]
    Print(String),

    /// The print command did not finish within the configured timeout.
    #[error("Print command timed out after {0:?}")]
    Timeout(Duration),
}

impl From<image::ImageError> for AgentError {
    fn from(err: image::ImageError) -> Self {
        Self::Render(err.to_string())
    }
}
