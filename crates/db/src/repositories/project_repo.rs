//! Repository for the `projects` table.

use sqlx::PgPool;

use crate::models::project::{CreateProject, Project};

/// Column list for `projects` queries.
const COLUMNS: &str = "id, slug, name, print_enabled, created_at, updated_at";

/// Provides lookups and inserts for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project. Printing is disabled unless requested.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (slug, name, print_enabled) \
             VALUES ($1, $2, COALESCE($3, false)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(input.print_enabled)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its URL slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE slug = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}
