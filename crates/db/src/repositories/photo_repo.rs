//! Repository for the `photos` table.
//!
//! `print_status_id` is deliberately absent from every write here: the
//! mirror is owned by [`PrintJobRepo`](super::PrintJobRepo).

use photobooth_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::photo::{CreatePhoto, Photo};

/// Column list for `photos` queries.
const COLUMNS: &str = "\
    id, project_id, storage_key, public_url, is_public, print_status_id, \
    created_at, updated_at";

/// Number of photos returned by the live-feed backfill.
pub const RECENT_PHOTOS_LIMIT: i64 = 30;

/// Provides inserts and lookups for photos.
pub struct PhotoRepo;

impl PhotoRepo {
    /// Insert a photo record for an already-uploaded object.
    pub async fn create(pool: &PgPool, input: &CreatePhoto) -> Result<Photo, sqlx::Error> {
        let query = format!(
            "INSERT INTO photos (project_id, storage_key, public_url, is_public) \
             VALUES ($1, $2, $3, COALESCE($4, true)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(input.project_id)
            .bind(&input.storage_key)
            .bind(&input.public_url)
            .bind(input.is_public)
            .fetch_one(pool)
            .await
    }

    /// Find a photo by its ID.
    ///
    /// Accepts a pool or an open transaction; the claim path reads the photo
    /// on the connection that already holds the job row.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Photo>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM photos WHERE id = $1");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Most recent public photos of a project, newest first.
    pub async fn list_recent_public(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
    ) -> Result<Vec<Photo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM photos \
             WHERE project_id = $1 AND is_public = true \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(project_id)
            .bind(limit.clamp(1, RECENT_PHOTOS_LIMIT))
            .fetch_all(pool)
            .await
    }
}
