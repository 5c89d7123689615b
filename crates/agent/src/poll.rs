//! Claim, print and report loop.
//!
//! One job at a time: claim from the queue, download the image, render the
//! print page, run the printer, report `done` or `error`. Failures never
//! escape the loop; before a claim they are logged and the loop backs off,
//! after a claim they become an `error` completion.

use std::path::PathBuf;
use std::time::Duration;

use photobooth_core::print_job::{
    ClaimedPrintJob, CompletePrintJob, CompletionOutcome, ERR_DOWNLOAD_FAILED, ERR_PRINT_FAILED,
    ERR_PRINT_TIMED_OUT, ERR_RENDER_FAILED,
};
use photobooth_core::types::DbId;
use tokio_util::sync::CancellationToken;

use crate::client::PrintQueueApi;
use crate::error::AgentError;
use crate::printer::Printer;
use crate::render;

/// Result of one poll iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The queue had nothing for us.
    Idle,
    /// A job was printed and reported `done`.
    Printed { job_id: DbId },
    /// A job was claimed but could not be printed; reported `error`.
    Failed { job_id: DbId, message: String },
}

/// The agent's sequential poll loop.
pub struct PollLoop<Q, P> {
    queue: Q,
    printer: P,
    spool_dir: PathBuf,
    poll_interval: Duration,
}

impl<Q, P> PollLoop<Q, P>
where
    Q: PrintQueueApi,
    P: Printer,
{
    pub fn new(queue: Q, printer: P, spool_dir: PathBuf, poll_interval: Duration) -> Self {
        Self {
            queue,
            printer,
            spool_dir,
            poll_interval,
        }
    }

    /// Run until `cancel` fires. Cancellation is honoured between jobs,
    /// never in the middle of one.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(spool_dir = %self.spool_dir.display(), "Poll loop started");

        while !cancel.is_cancelled() {
            let pause = match self.run_once().await {
                Ok(PollOutcome::Idle) => Some(self.poll_interval),
                Ok(_) => None,
                Err(e) => {
                    tracing::error!(error = %e, "Claim failed");
                    Some(self.poll_interval)
                }
            };

            if let Some(pause) = pause {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        }

        tracing::info!("Poll loop stopped");
    }

    /// Claim and process at most one job.
    ///
    /// Only a failed claim is returned as an error. Everything after the
    /// claim is folded into the outcome.
    pub async fn run_once(&self) -> Result<PollOutcome, AgentError> {
        let Some(job) = self.queue.claim().await? else {
            return Ok(PollOutcome::Idle);
        };

        tracing::info!(
            job_id = job.id,
            photo_id = job.photo_id,
            attempt = job.attempt,
            copies = job.copies,
            "Claimed print job",
        );

        let result = self.print_job(&job).await;
        let (body, outcome) = match result {
            Ok(()) => (
                CompletePrintJob {
                    attempt: job.attempt,
                    status: CompletionOutcome::Done,
                    error_message: None,
                },
                PollOutcome::Printed { job_id: job.id },
            ),
            Err(e) => {
                let message = failure_message(&e).to_string();
                tracing::warn!(job_id = job.id, error = %e, "Print job failed");
                (
                    CompletePrintJob {
                        attempt: job.attempt,
                        status: CompletionOutcome::Error,
                        error_message: Some(message.clone()),
                    },
                    PollOutcome::Failed {
                        job_id: job.id,
                        message,
                    },
                )
            }
        };

        // A lost report is recovered by lease expiry on the server.
        if let Err(e) = self.queue.complete(job.id, &body).await {
            tracing::error!(job_id = job.id, error = %e, "Failed to report job outcome");
        } else {
            tracing::info!(job_id = job.id, status = ?body.status, "Reported job outcome");
        }

        Ok(outcome)
    }

    async fn print_job(&self, job: &ClaimedPrintJob) -> Result<(), AgentError> {
        let bytes = self.queue.download_image(&job.image_url).await?;

        let spool_dir = self.spool_dir.clone();
        let page = tokio::task::spawn_blocking(move || render::render_page(&bytes, &spool_dir))
            .await
            .map_err(|e| AgentError::Render(format!("render task failed: {e}")))??;

        // `page` is removed when it goes out of scope, whatever the print result.
        self.printer.print(page.path(), job.copies).await
    }
}

/// Message reported to the queue for a failed attempt.
fn failure_message(err: &AgentError) -> &'static str {
    match err {
        AgentError::Download(_) => ERR_DOWNLOAD_FAILED,
        AgentError::Render(_) => ERR_RENDER_FAILED,
        AgentError::Timeout(_) => ERR_PRINT_TIMED_OUT,
        AgentError::Print(_) | AgentError::Request(_) | AgentError::ApiError { .. } => {
            ERR_PRINT_FAILED
        }
    }
}
