//! Periodic failing of print jobs whose last allowed lease expired.
//!
//! Expired leases with attempts left are reclaimed by the next agent claim.
//! Jobs that already used `max_attempts` claims would otherwise sit in
//! `PRINTING` forever; this task moves them to `ERROR`.

use std::time::Duration;

use photobooth_db::repositories::PrintJobRepo;
use tokio_util::sync::CancellationToken;

use crate::print_queue::publish_status;
use crate::state::AppState;

/// Run one reaper pass. Returns how many jobs were failed.
pub async fn reap_once(state: &AppState) -> Result<usize, sqlx::Error> {
    let failed =
        PrintJobRepo::fail_exhausted_leases(&state.pool, state.config.lease.max_attempts).await?;

    for job in &failed {
        tracing::warn!(
            job_id = job.id,
            photo_id = job.photo_id,
            attempts = job.attempts,
            holder = job.locked_by.as_deref().unwrap_or(""),
            "Lease expired on final attempt, job failed",
        );
        publish_status(state, job).await;
    }

    Ok(failed.len())
}

/// Run the lease reaper loop until `cancel` is triggered.
pub async fn run(state: AppState, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        max_attempts = state.config.lease.max_attempts,
        "Lease reaper started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Lease reaper stopping");
                break;
            }
            _ = ticker.tick() => {
                match reap_once(&state).await {
                    Ok(0) => tracing::debug!("Lease reaper: nothing to fail"),
                    Ok(failed) => tracing::info!(failed, "Lease reaper: failed exhausted jobs"),
                    Err(e) => tracing::error!(error = %e, "Lease reaper: pass failed"),
                }
            }
        }
    }
}
