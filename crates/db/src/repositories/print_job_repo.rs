//! Repository for the `print_jobs` table: the durable print queue.
//!
//! Every status change also writes the same status onto
//! `photos.print_status_id` inside the same transaction, so UI reads of the
//! photo never disagree with the job for longer than one commit.
//!
//! A job is claimable when it is `QUEUED` and unlocked, or `PRINTING` with an
//! expired lease and attempts left. The claim UPDATE repeats that predicate;
//! it is the only thing standing between two agents that selected the same
//! row.

use photobooth_core::print_job::{
    completion_error_message, lease_expired_message, CompletionOutcome, LeaseSettings,
};
use photobooth_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::print_job::{CompletionResult, PrintJob};
use crate::models::status::PrintJobStatus;

/// Column list for `print_jobs` queries.
const COLUMNS: &str = "\
    id, project_id, photo_id, status_id, copies, attempts, \
    locked_at, locked_by, lease_expires_at, error_message, completed_at, \
    created_at, updated_at";

/// Eligibility predicate shared by selection and the guarded update.
///
/// `$q` = QUEUED id, `$p` = PRINTING id, `$m` = max attempts.
fn eligible_predicate(q: u8, p: u8, m: u8) -> String {
    format!(
        "((status_id = ${q} AND locked_at IS NULL) \
          OR (status_id = ${p} AND lease_expires_at < NOW() AND attempts < ${m}))"
    )
}

/// Provides the queue operations for print jobs.
pub struct PrintJobRepo;

impl PrintJobRepo {
    /// Enqueue a print job for a photo and mirror `QUEUED` onto the photo.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        photo_id: DbId,
        copies: i16,
    ) -> Result<PrintJob, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO print_jobs (project_id, photo_id, status_id, copies) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let job = sqlx::query_as::<_, PrintJob>(&query)
            .bind(project_id)
            .bind(photo_id)
            .bind(PrintJobStatus::Queued.id())
            .bind(copies)
            .fetch_one(&mut *tx)
            .await?;

        Self::mirror_photo_status(&mut tx, job.photo_id, PrintJobStatus::Queued).await?;

        tx.commit().await?;
        Ok(job)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PrintJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM print_jobs WHERE id = $1");
        sqlx::query_as::<_, PrintJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Claim the oldest eligible job for `agent_id` inside `tx`.
    ///
    /// Returns `None` when the queue is empty or another caller won the race
    /// for the selected row; the selection is not retried within this call.
    /// On success the job is `PRINTING` with a fresh lease, `attempts` has
    /// been incremented and the photo mirror reads `PRINTING`. The caller
    /// commits.
    pub async fn claim_next(
        tx: &mut Transaction<'_, Postgres>,
        agent_id: &str,
        lease: &LeaseSettings,
    ) -> Result<Option<PrintJob>, sqlx::Error> {
        let select = format!(
            "SELECT id FROM print_jobs \
             WHERE {} \
             ORDER BY created_at ASC, id ASC \
             LIMIT 1 \
             FOR UPDATE SKIP LOCKED",
            eligible_predicate(1, 2, 3),
        );
        let candidate: Option<(DbId,)> = sqlx::query_as(&select)
            .bind(PrintJobStatus::Queued.id())
            .bind(PrintJobStatus::Printing.id())
            .bind(lease.max_attempts)
            .fetch_optional(&mut **tx)
            .await?;

        let Some((job_id,)) = candidate else {
            return Ok(None);
        };

        let update = format!(
            "UPDATE print_jobs \
             SET status_id = $2, locked_at = NOW(), locked_by = $4, \
                 lease_expires_at = NOW() + make_interval(secs => $5), \
                 attempts = attempts + 1, updated_at = NOW() \
             WHERE id = $6 AND {} \
             RETURNING {COLUMNS}",
            eligible_predicate(1, 2, 3),
        );
        let claimed = sqlx::query_as::<_, PrintJob>(&update)
            .bind(PrintJobStatus::Queued.id())
            .bind(PrintJobStatus::Printing.id())
            .bind(lease.max_attempts)
            .bind(agent_id)
            .bind(lease.lease_secs as f64)
            .bind(job_id)
            .fetch_optional(&mut **tx)
            .await?;

        let Some(job) = claimed else {
            tracing::debug!(job_id, agent_id, "Claim race lost");
            return Ok(None);
        };

        Self::mirror_photo_status(tx, job.photo_id, PrintJobStatus::Printing).await?;
        Ok(Some(job))
    }

    /// Force a job to `ERROR` inside `tx` and mirror it onto the photo.
    ///
    /// Used when a freshly claimed job turns out to be unprintable and by
    /// the lease reaper. The caller commits.
    pub async fn fail_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        job_id: DbId,
        message: &str,
    ) -> Result<PrintJob, sqlx::Error> {
        let query = format!(
            "UPDATE print_jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let job = sqlx::query_as::<_, PrintJob>(&query)
            .bind(job_id)
            .bind(PrintJobStatus::Error.id())
            .bind(message)
            .fetch_one(&mut **tx)
            .await?;

        Self::mirror_photo_status(tx, job.photo_id, PrintJobStatus::Error).await?;
        Ok(job)
    }

    /// Record the terminal outcome of claim `attempt`, held by `agent_id`.
    ///
    /// Returns `None` if the job does not exist. The write only applies
    /// while the job is `PRINTING`, locked by `agent_id` and still on
    /// `attempt`; agent ids are self-reported, so the attempt number is what
    /// tells a stale claim from the current one. A repeat of the same outcome
    /// for the same claim is reported as [`CompletionResult::Replayed`],
    /// anything else as [`CompletionResult::Rejected`] with the row left
    /// untouched.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        agent_id: &str,
        attempt: i32,
        outcome: CompletionOutcome,
        error_message: Option<&str>,
    ) -> Result<Option<CompletionResult>, sqlx::Error> {
        let target = PrintJobStatus::from(outcome);
        let message = completion_error_message(outcome, error_message);

        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE print_jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 AND locked_by = $5 AND attempts = $6 \
             RETURNING {COLUMNS}"
        );
        let applied = sqlx::query_as::<_, PrintJob>(&query)
            .bind(job_id)
            .bind(target.id())
            .bind(&message)
            .bind(PrintJobStatus::Printing.id())
            .bind(agent_id)
            .bind(attempt)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(job) = applied {
            Self::mirror_photo_status(&mut tx, job.photo_id, target).await?;
            tx.commit().await?;
            return Ok(Some(CompletionResult::Applied(job)));
        }

        let query = format!("SELECT {COLUMNS} FROM print_jobs WHERE id = $1");
        let current = sqlx::query_as::<_, PrintJob>(&query)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(current.map(|job| {
            let same_claim = job.locked_by.as_deref() == Some(agent_id) && job.attempts == attempt;
            if same_claim && job.status_id == target.id() {
                CompletionResult::Replayed(job)
            } else {
                CompletionResult::Rejected(job)
            }
        }))
    }

    /// Move `PRINTING` jobs whose lease expired on their final allowed
    /// attempt to `ERROR`. Returns the jobs that were failed.
    pub async fn fail_exhausted_leases(
        pool: &PgPool,
        max_attempts: i32,
    ) -> Result<Vec<PrintJob>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM print_jobs \
             WHERE status_id = $1 AND lease_expires_at < NOW() AND attempts >= $2 \
             ORDER BY created_at ASC, id ASC \
             FOR UPDATE SKIP LOCKED"
        );
        let expired = sqlx::query_as::<_, PrintJob>(&query)
            .bind(PrintJobStatus::Printing.id())
            .bind(max_attempts)
            .fetch_all(&mut *tx)
            .await?;

        let mut failed = Vec::with_capacity(expired.len());
        for job in expired {
            let message = lease_expired_message(job.attempts);
            failed.push(Self::fail_in_tx(&mut tx, job.id, &message).await?);
        }

        tx.commit().await?;
        Ok(failed)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Write the job status onto the owning photo within `tx`.
    async fn mirror_photo_status(
        tx: &mut Transaction<'_, Postgres>,
        photo_id: DbId,
        status: PrintJobStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE photos SET print_status_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(photo_id)
            .bind(status.id())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
