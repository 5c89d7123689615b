//! Shared building blocks for the photobooth print queue.
//!
//! This crate has no internal dependencies so it can be used by the
//! repository layer, the API server and the printer agent alike.

pub mod error;
pub mod feed;
pub mod hashing;
pub mod image_url;
pub mod print_job;
pub mod project;
pub mod types;
