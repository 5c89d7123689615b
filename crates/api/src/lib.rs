//! Photobooth API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! live feed and the lease reaper) so integration tests and the binary
//! entrypoint share them.

pub mod background;
pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod middleware;
pub mod print_queue;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
