//! Print job entity and DTOs.

use photobooth_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{PrintJobStatus, StatusId};

/// A row from the `print_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrintJob {
    pub id: DbId,
    pub project_id: DbId,
    pub photo_id: DbId,
    pub status_id: StatusId,
    pub copies: i16,
    pub attempts: i32,
    pub locked_at: Option<Timestamp>,
    pub locked_by: Option<String>,
    pub lease_expires_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PrintJob {
    /// Typed status. Rows always carry a seeded id, so `None` means the
    /// lookup table and the enum have drifted apart.
    pub fn status(&self) -> Option<PrintJobStatus> {
        PrintJobStatus::from_id(self.status_id)
    }

    /// Wire name of the status, `"UNKNOWN"` if the id is not recognised.
    pub fn status_name(&self) -> &'static str {
        self.status().map(PrintJobStatus::name).unwrap_or("UNKNOWN")
    }
}

/// Body of `POST /api/v1/print-jobs`.
#[derive(Debug, Deserialize)]
pub struct CreatePrintJob {
    pub project_slug: String,
    pub photo_id: DbId,
    pub copies: Option<i16>,
}

/// Result of a completion attempt against an existing job.
#[derive(Debug, Clone)]
pub enum CompletionResult {
    /// The caller held the claim and the terminal status was written.
    Applied(PrintJob),
    /// The caller already completed this attempt with the same outcome.
    Replayed(PrintJob),
    /// The caller does not hold the claim, or the job is in another state.
    Rejected(PrintJob),
}
