//! Project entity (one per event).

use photobooth_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub print_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a project.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub slug: String,
    pub name: String,
    pub print_enabled: Option<bool>,
}
