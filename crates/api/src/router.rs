//! Application router and middleware stack.
//!
//! Three kinds of client share this router: the booth UI and screen views
//! (browsers, cross-origin), and the printer agent (plain HTTP, key header).
//! `main.rs` and the integration tests both build through [`build_app_router`].

use std::any::Any;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use photobooth_core::print_job::{AGENT_ID_HEADER, AGENT_KEY_HEADER};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::error::ErrorBody;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request id, set when the client did not send one.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full application [`Router`].
///
/// Outermost first: CORS, request id, tracing, request id echo, timeout,
/// panic recovery. The feed WebSocket is only subject to the timeout until
/// the upgrade response is sent.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// CORS for the booth and screen origins.
///
/// The API uses no cookies, so credentials stay off. The agent headers are
/// allowed so a browser-hosted agent console can call the queue. Origins
/// were validated by [`ServerConfig::from_lookup`]; any that fail to parse
/// here are skipped.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(AGENT_KEY_HEADER),
            HeaderName::from_static(AGENT_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(3600))
}

/// Turn a handler panic into the usual JSON error body.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    tracing::error!(panic = %detail, "Handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::internal())).into_response()
}
