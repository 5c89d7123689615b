//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod photo_repo;
pub mod print_job_repo;
pub mod project_repo;

pub use photo_repo::PhotoRepo;
pub use print_job_repo::PrintJobRepo;
pub use project_repo::ProjectRepo;
