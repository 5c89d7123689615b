//! Handlers for the `/print-jobs` resource.
//!
//! Creating and polling jobs is open to the booth UI. Claiming and
//! completing require a [`PrintAgent`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photobooth_core::print_job::CompletePrintJob;
use photobooth_core::types::DbId;
use photobooth_db::models::print_job::{CreatePrintJob, PrintJob};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::agent::PrintAgent;
use crate::print_queue;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a successful print request.
#[derive(Debug, Serialize)]
pub struct QueuedJob {
    pub job_id: DbId,
    pub status: &'static str,
}

/// Status of a job after completion or when polled.
#[derive(Debug, Serialize)]
pub struct JobStatus {
    pub id: DbId,
    pub status: &'static str,
    pub error_message: Option<String>,
}

impl From<PrintJob> for JobStatus {
    fn from(job: PrintJob) -> Self {
        Self {
            id: job.id,
            status: job.status_name(),
            error_message: job.error_message,
        }
    }
}

/// POST /api/v1/print-jobs
///
/// Queue a photo for printing. Returns 201 with the new job id.
pub async fn create_print_job(
    State(state): State<AppState>,
    Json(input): Json<CreatePrintJob>,
) -> AppResult<impl IntoResponse> {
    let job = print_queue::enqueue(&state, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: QueuedJob {
                job_id: job.id,
                status: job.status_name(),
            },
        }),
    ))
}

/// POST /api/v1/print-jobs/claim
///
/// Claim the oldest eligible job. `data` is `null` when there is nothing
/// to print.
pub async fn claim_print_job(
    agent: PrintAgent,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let claimed = print_queue::claim(&state, &agent.agent_id).await?;
    Ok(Json(DataResponse { data: claimed }))
}

/// POST /api/v1/print-jobs/{id}/complete
pub async fn complete_print_job(
    agent: PrintAgent,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Json(input): Json<CompletePrintJob>,
) -> AppResult<impl IntoResponse> {
    let job = print_queue::complete(&state, job_id, &agent.agent_id, &input).await?;
    Ok(Json(DataResponse {
        data: JobStatus::from(job),
    }))
}

/// GET /api/v1/print-jobs/{id}
pub async fn get_print_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = print_queue::find(&state, job_id).await?;
    Ok(Json(DataResponse {
        data: JobStatus::from(job),
    }))
}
