//! Live feed event envelope for the public screen view.
//!
//! Events are fanned out per project and serialized as JSON text frames
//! with a `type` tag.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Event pushed to live feed subscribers of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A public photo was added to the project.
    PhotoNew {
        photo_id: DbId,
        image_url: Option<String>,
        created_at: Timestamp,
    },
    /// A photo's print status changed.
    PrintStatus {
        job_id: DbId,
        photo_id: DbId,
        status: String,
    },
}
