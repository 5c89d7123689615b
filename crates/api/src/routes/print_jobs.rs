use axum::routing::{get, post};
use axum::Router;

use crate::handlers::print_jobs;
use crate::state::AppState;

/// Routes mounted at `/print-jobs`.
///
/// ```text
/// POST   /                -> create_print_job
/// POST   /claim           -> claim_print_job
/// GET    /{id}            -> get_print_job
/// POST   /{id}/complete   -> complete_print_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(print_jobs::create_print_job))
        .route("/claim", post(print_jobs::claim_print_job))
        .route("/{id}", get(print_jobs::get_print_job))
        .route("/{id}/complete", post(print_jobs::complete_print_job))
}
