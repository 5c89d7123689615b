//! Live photo feed for the public screen view.
//!
//! [`FeedRegistry`] owns one broadcast channel per project; the WebSocket
//! [`handler`] subscribes a socket for its lifetime.

pub mod handler;
pub mod registry;

pub use registry::{FeedRegistry, FeedSubscription};
