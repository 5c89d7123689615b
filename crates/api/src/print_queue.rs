//! Print queue operations behind the HTTP handlers.
//!
//! Each operation commits its database transaction before publishing feed
//! events, so subscribers never see a status the store could still roll
//! back.

use photobooth_core::error::CoreError;
use photobooth_core::feed::FeedEvent;
use photobooth_core::print_job::{
    validate_copies, ClaimedPrintJob, CompletePrintJob, ERR_MISSING_IMAGE_URL,
};
use photobooth_core::project::validate_slug;
use photobooth_core::types::DbId;
use photobooth_db::models::print_job::{CompletionResult, CreatePrintJob, PrintJob};
use photobooth_db::repositories::{PhotoRepo, PrintJobRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Queue a print of one photo.
///
/// Fails with `NotFound` for an unknown project or a photo outside it, and
/// with `PrintingDisabled` when the project has printing switched off; no row is
/// written in either case.
pub async fn enqueue(state: &AppState, input: &CreatePrintJob) -> AppResult<PrintJob> {
    validate_slug(&input.project_slug)?;
    let copies = validate_copies(input.copies)?;

    let project = ProjectRepo::find_by_slug(&state.pool, &input.project_slug)
        .await?
        .ok_or_else(|| CoreError::NotFoundByKey {
            entity: "Project",
            key: input.project_slug.clone(),
        })?;

    if !project.print_enabled {
        return Err(AppError::PrintingDisabled { slug: project.slug });
    }

    let photo = PhotoRepo::find_by_id(&state.pool, input.photo_id)
        .await?
        .filter(|photo| photo.project_id == project.id)
        .ok_or(CoreError::NotFound {
            entity: "Photo",
            id: input.photo_id,
        })?;

    let job = PrintJobRepo::create(&state.pool, project.id, photo.id, copies).await?;

    tracing::info!(
        job_id = job.id,
        photo_id = job.photo_id,
        project_id = job.project_id,
        copies,
        "Print job queued",
    );
    publish_status(state, &job).await;

    Ok(job)
}

/// Claim the next eligible job for `agent_id`.
///
/// `None` covers an empty queue, a lost race and a claimed job whose photo
/// has no downloadable URL. The last case is failed server-side with
/// [`ERR_MISSING_IMAGE_URL`] so no agent ever receives it.
pub async fn claim(state: &AppState, agent_id: &str) -> AppResult<Option<ClaimedPrintJob>> {
    let mut tx = state.pool.begin().await?;

    let Some(job) = PrintJobRepo::claim_next(&mut tx, agent_id, &state.config.lease).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    let photo = PhotoRepo::find_by_id(&mut *tx, job.photo_id).await?;
    let image_url = match &photo {
        Some(photo) => match state.image_urls.resolve(photo.location()).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(job_id = job.id, photo_id = photo.id, error = %e, "Image URL resolution failed");
                None
            }
        },
        None => None,
    };

    let Some(image_url) = image_url else {
        let failed = PrintJobRepo::fail_in_tx(&mut tx, job.id, ERR_MISSING_IMAGE_URL).await?;
        tx.commit().await?;
        tracing::warn!(
            job_id = failed.id,
            photo_id = failed.photo_id,
            agent_id,
            "Claimed job has no image URL, marked as error",
        );
        publish_status(state, &failed).await;
        return Ok(None);
    };

    tx.commit().await?;

    tracing::info!(
        job_id = job.id,
        photo_id = job.photo_id,
        agent_id,
        attempts = job.attempts,
        "Print job claimed",
    );
    publish_status(state, &job).await;

    Ok(Some(ClaimedPrintJob {
        id: job.id,
        status: job.status_name().to_string(),
        project_id: job.project_id,
        photo_id: job.photo_id,
        copies: job.copies,
        attempt: job.attempts,
        image_url,
        lease_expires_at: job.lease_expires_at,
    }))
}

/// Record the outcome of the claim `agent_id` holds on `job_id`.
///
/// The report must carry the attempt number handed out with the claim. A
/// repeat of an already-applied outcome for the same claim returns the
/// stored job. Anything else that does not match the current claim is a
/// `Conflict`.
pub async fn complete(
    state: &AppState,
    job_id: DbId,
    agent_id: &str,
    input: &CompletePrintJob,
) -> AppResult<PrintJob> {
    let result = PrintJobRepo::complete(
        &state.pool,
        job_id,
        agent_id,
        input.attempt,
        input.status,
        input.error_message.as_deref(),
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Print job",
        id: job_id,
    })?;

    match result {
        CompletionResult::Applied(job) => {
            tracing::info!(
                job_id,
                photo_id = job.photo_id,
                agent_id,
                status = job.status_name(),
                error_message = job.error_message.as_deref().unwrap_or(""),
                "Print job completed",
            );
            publish_status(state, &job).await;
            Ok(job)
        }
        CompletionResult::Replayed(job) => {
            tracing::debug!(job_id, agent_id, "Duplicate completion ignored");
            Ok(job)
        }
        CompletionResult::Rejected(job) => {
            tracing::warn!(
                job_id,
                agent_id,
                attempt = input.attempt,
                current_attempt = job.attempts,
                holder = job.locked_by.as_deref().unwrap_or(""),
                status = job.status_name(),
                "Completion rejected",
            );
            Err(CoreError::Conflict(format!(
                "Print job {job_id} is {} and attempt {} is not held by agent '{agent_id}'",
                job.status_name(),
                input.attempt
            ))
            .into())
        }
    }
}

/// Look up a job for status polling.
pub async fn find(state: &AppState, job_id: DbId) -> AppResult<PrintJob> {
    PrintJobRepo::find_by_id(&state.pool, job_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Print job",
                id: job_id,
            }
            .into()
        })
}

/// Push a job's current status to its project's feed.
pub async fn publish_status(state: &AppState, job: &PrintJob) {
    let event = FeedEvent::PrintStatus {
        job_id: job.id,
        photo_id: job.photo_id,
        status: job.status_name().to_string(),
    };
    let delivered = state.feed.publish(job.project_id, event).await;
    tracing::trace!(job_id = job.id, delivered, "Print status published");
}
