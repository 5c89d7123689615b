use axum::routing::get;
use axum::Router;

use crate::feed::handler::feed_ws;
use crate::handlers::photos;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /{slug}/photos   -> list_photos
/// POST   /{slug}/photos   -> register_photo
/// GET    /{slug}/feed     -> feed_ws (WebSocket upgrade)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{slug}/photos",
            get(photos::list_photos).post(photos::register_photo),
        )
        .route("/{slug}/feed", get(feed_ws))
}
