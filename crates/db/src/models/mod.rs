//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the create DTO used for inserts.

pub mod photo;
pub mod print_job;
pub mod project;
pub mod status;
