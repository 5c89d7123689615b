use std::sync::Arc;

use photobooth_core::image_url::ImageUrlResolver;

use crate::config::ServerConfig;
use crate::feed::FeedRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: photobooth_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Turns a photo location into a URL an agent can download.
    pub image_urls: Arc<dyn ImageUrlResolver>,
    /// Per-project live feed channels.
    pub feed: Arc<FeedRegistry>,
}
