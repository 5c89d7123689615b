#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use photobooth_api::config::ServerConfig;
use photobooth_api::feed::FeedRegistry;
use photobooth_api::router::build_app_router;
use photobooth_api::state::AppState;
use photobooth_core::image_url::ImageUrlResolver;
use photobooth_core::print_job::{LeaseSettings, AGENT_ID_HEADER, AGENT_KEY_HEADER};
use photobooth_db::models::photo::{CreatePhoto, Photo};
use photobooth_db::models::project::{CreateProject, Project};
use photobooth_db::repositories::{PhotoRepo, ProjectRepo};
use photobooth_storage::{PhotoUrlResolver, StorageConfig};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_AGENT_KEY: &str = "test-agent-key";

/// Test configuration: local CORS origin, a known agent key, default lease.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        print_agent_key: Some(TEST_AGENT_KEY.to_string()),
        lease: LeaseSettings::default(),
        lease_reaper_interval_secs: 60,
        storage: StorageConfig {
            public_base_url: Some("https://cdn.example.com".to_string()),
            ..StorageConfig::default()
        },
    }
}

/// State with the given config and a resolver that only uses stored URLs.
pub fn test_state_with(pool: PgPool, config: ServerConfig) -> AppState {
    test_state_with_resolver(pool, config, Arc::new(PhotoUrlResolver::public_only()))
}

pub fn test_state_with_resolver(
    pool: PgPool,
    config: ServerConfig,
    image_urls: Arc<dyn ImageUrlResolver>,
) -> AppState {
    AppState {
        pool,
        config: Arc::new(config),
        image_urls,
        feed: Arc::new(FeedRegistry::new()),
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    test_state_with(pool, test_config())
}

/// Full application router, same middleware stack as production.
pub fn build_test_app(pool: PgPool) -> Router {
    app_for(test_state(pool))
}

pub fn app_for(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST as a printer agent with the test key.
pub async fn post_agent(app: Router, uri: &str, agent_id: &str, body: Option<Value>) -> Response<Body> {
    post_with_key(app, uri, Some(TEST_AGENT_KEY), agent_id, body).await
}

pub async fn post_with_key(
    app: Router,
    uri: &str,
    key: Option<&str>,
    agent_id: &str,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(AGENT_ID_HEADER, agent_id);
    if let Some(key) = key {
        builder = builder.header(AGENT_KEY_HEADER, key);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn seed_project(pool: &PgPool, slug: &str, print_enabled: bool) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            slug: slug.to_string(),
            name: format!("Event {slug}"),
            print_enabled: Some(print_enabled),
        },
    )
    .await
    .unwrap()
}

/// Photo with a stored public URL unless `public_url` is `None`.
pub async fn seed_photo(pool: &PgPool, project_id: i64, key: &str, public_url: Option<&str>) -> Photo {
    PhotoRepo::create(
        pool,
        &CreatePhoto {
            project_id,
            storage_key: key.to_string(),
            public_url: public_url.map(str::to_string),
            is_public: Some(true),
        },
    )
    .await
    .unwrap()
}

pub async fn print_job_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM print_jobs")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}
