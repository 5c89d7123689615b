pub mod health;
pub mod print_jobs;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /print-jobs                          create (POST)
/// /print-jobs/claim                    claim next job (POST, agent key)
/// /print-jobs/{id}                     status (GET)
/// /print-jobs/{id}/complete            report outcome (POST, agent key)
///
/// /projects/{slug}/photos              recent public photos (GET), register (POST)
/// /projects/{slug}/feed                live feed (WebSocket)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/print-jobs", print_jobs::router())
        .nest("/projects", projects::router())
}
