//! `photobooth-agent` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod printer;
pub mod render;
