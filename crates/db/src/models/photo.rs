//! Photo entity and DTOs.

use photobooth_core::image_url::PhotoLocation;
use photobooth_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{PrintJobStatus, StatusId};

/// A row from the `photos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Photo {
    pub id: DbId,
    pub project_id: DbId,
    pub storage_key: String,
    pub public_url: Option<String>,
    pub is_public: bool,
    /// Denormalized mirror of the owning print job's status.
    pub print_status_id: Option<StatusId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Photo {
    /// Storage location used to resolve a downloadable URL.
    pub fn location(&self) -> PhotoLocation<'_> {
        PhotoLocation {
            storage_key: &self.storage_key,
            public_url: self.public_url.as_deref(),
        }
    }

    /// Mirrored print status, if the photo was ever queued for printing.
    pub fn print_status(&self) -> Option<PrintJobStatus> {
        self.print_status_id.and_then(PrintJobStatus::from_id)
    }
}

/// DTO for inserting a photo record.
#[derive(Debug, Deserialize)]
pub struct CreatePhoto {
    pub project_id: DbId,
    pub storage_key: String,
    pub public_url: Option<String>,
    pub is_public: Option<bool>,
}
