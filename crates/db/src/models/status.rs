//! Print status enum mapping to the `print_job_statuses` lookup table.
//!
//! Each variant's discriminant matches the seed data id in
//! `20261001000001_create_print_job_statuses_table.sql`.

use photobooth_core::print_job::CompletionOutcome;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Print job lifecycle status, also mirrored onto `photos.print_status_id`.
///
/// `QUEUED -> PRINTING -> {DONE, ERROR}`. `DONE` and `ERROR` are terminal.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintJobStatus {
    Queued = 1,
    Printing = 2,
    Done = 3,
    Error = 4,
}

impl PrintJobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Wire name, matching the lookup table `name` column.
    pub fn name(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Printing => "PRINTING",
            Self::Done => "DONE",
            Self::Error => "ERROR",
        }
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Queued),
            2 => Some(Self::Printing),
            3 => Some(Self::Done),
            4 => Some(Self::Error),
            _ => None,
        }
    }

    /// `DONE` and `ERROR` accept no further protocol-driven transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl From<PrintJobStatus> for StatusId {
    fn from(value: PrintJobStatus) -> Self {
        value as StatusId
    }
}

impl From<CompletionOutcome> for PrintJobStatus {
    fn from(outcome: CompletionOutcome) -> Self {
        match outcome {
            CompletionOutcome::Done => Self::Done,
            CompletionOutcome::Error => Self::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_job_status_ids_match_seed_data() {
        assert_eq!(PrintJobStatus::Queued.id(), 1);
        assert_eq!(PrintJobStatus::Printing.id(), 2);
        assert_eq!(PrintJobStatus::Done.id(), 3);
        assert_eq!(PrintJobStatus::Error.id(), 4);
    }

    #[test]
    fn status_id_round_trips_through_from_id() {
        for status in [
            PrintJobStatus::Queued,
            PrintJobStatus::Printing,
            PrintJobStatus::Done,
            PrintJobStatus::Error,
        ] {
            assert_eq!(PrintJobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(PrintJobStatus::from_id(0), None);
        assert_eq!(PrintJobStatus::from_id(5), None);
    }

    #[test]
    fn outcome_maps_to_terminal_status() {
        assert_eq!(PrintJobStatus::from(CompletionOutcome::Done), PrintJobStatus::Done);
        assert_eq!(PrintJobStatus::from(CompletionOutcome::Error), PrintJobStatus::Error);
        assert!(PrintJobStatus::Done.is_terminal());
        assert!(PrintJobStatus::Error.is_terminal());
        assert!(!PrintJobStatus::Printing.is_terminal());
    }
}
