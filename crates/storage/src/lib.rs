//! Photo storage access for the print queue.
//!
//! Turns a photo's stored location into a URL that a printer agent can
//! download without credentials: either the public URL recorded at
//! registration, or a short-lived S3 presigned GET.

pub mod config;
pub mod error;
pub mod presign;
pub mod resolver;

pub use config::StorageConfig;
pub use error::StorageError;
pub use presign::S3Presigner;
pub use resolver::PhotoUrlResolver;
