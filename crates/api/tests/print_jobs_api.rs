//! Integration tests for the `/print-jobs` endpoints.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{
    body_json, get, post_agent, post_json, post_with_key, print_job_count, seed_photo,
    seed_project, TEST_AGENT_KEY,
};
use photobooth_core::error::CoreError;
use photobooth_core::feed::FeedEvent;
use photobooth_core::image_url::{ImageUrlResolver, PhotoLocation};
use photobooth_db::models::status::PrintJobStatus;
use photobooth_db::repositories::{PhotoRepo, PrintJobRepo};
use serde_json::json;
use sqlx::PgPool;

const CLAIM: &str = "/api/v1/print-jobs/claim";

async fn request_print(app: axum::Router, slug: &str, photo_id: i64) -> i64 {
    let response = post_json(
        app,
        "/api/v1/print-jobs",
        json!({ "project_slug": slug, "photo_id": photo_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["job_id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Scenario: happy path
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn queue_claim_complete_happy_path(pool: PgPool) {
    let project = seed_project(&pool, "gala", true).await;
    let photo = seed_photo(&pool, project.id, "gala/1.jpg", Some("https://cdn.example.com/gala/1.jpg")).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/print-jobs",
        json!({ "project_slug": "gala", "photo_id": photo.id, "copies": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "QUEUED");
    let job_id = json["data"]["job_id"].as_i64().unwrap();

    let response = post_agent(common::build_test_app(pool.clone()), CLAIM, "booth-1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let claimed = body_json(response).await["data"].clone();
    assert_eq!(claimed["id"], job_id);
    assert_eq!(claimed["status"], "PRINTING");
    assert_eq!(claimed["photo_id"], photo.id);
    assert_eq!(claimed["project_id"], project.id);
    assert_eq!(claimed["copies"], 2);
    assert_eq!(claimed["attempt"], 1);
    assert_eq!(claimed["image_url"], "https://cdn.example.com/gala/1.jpg");
    assert!(claimed["lease_expires_at"].is_string());

    let response = post_agent(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/print-jobs/{job_id}/complete"),
        "booth-1",
        Some(json!({ "attempt": 1, "status": "done" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], job_id);
    assert_eq!(json["data"]["status"], "DONE");
    assert!(json["data"]["error_message"].is_null());

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/print-jobs/{job_id}"),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["status"], "DONE");

    let photo = PhotoRepo::find_by_id(&pool, photo.id).await.unwrap().unwrap();
    assert_eq!(photo.print_status(), Some(PrintJobStatus::Done));
    let job = PrintJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.attempts, 1);
    assert_eq!(job.locked_by.as_deref(), Some("booth-1"));
}

// ---------------------------------------------------------------------------
// Scenario: printer failure
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn printer_failure_records_default_message(pool: PgPool) {
    let project = seed_project(&pool, "fail", true).await;
    let photo = seed_photo(&pool, project.id, "fail/1.jpg", Some("https://cdn.example.com/fail/1.jpg")).await;
    let job_id = request_print(common::build_test_app(pool.clone()), "fail", photo.id).await;

    post_agent(common::build_test_app(pool.clone()), CLAIM, "agent", None).await;
    let response = post_agent(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/print-jobs/{job_id}/complete"),
        "agent",
        Some(json!({ "attempt": 1, "status": "error" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ERROR");
    assert_eq!(json["data"]["error_message"], "Print failed");

    let photo = PhotoRepo::find_by_id(&pool, photo.id).await.unwrap().unwrap();
    assert_eq!(photo.print_status(), Some(PrintJobStatus::Error));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reported_error_message_is_kept(pool: PgPool) {
    let project = seed_project(&pool, "paper", true).await;
    let photo = seed_photo(&pool, project.id, "paper/1.jpg", Some("https://cdn.example.com/paper/1.jpg")).await;
    let job_id = request_print(common::build_test_app(pool.clone()), "paper", photo.id).await;

    post_agent(common::build_test_app(pool.clone()), CLAIM, "agent", None).await;
    let response = post_agent(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/print-jobs/{job_id}/complete"),
        "agent",
        Some(json!({ "attempt": 1, "status": "error", "error_message": "Failed to download image" })),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["error_message"], "Failed to download image");
}

// ---------------------------------------------------------------------------
// Scenario: empty queue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_on_empty_queue_returns_null(pool: PgPool) {
    let response = post_agent(common::build_test_app(pool.clone()), CLAIM, "agent", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"].is_null());
    assert_eq!(print_job_count(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Print request validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn disabled_printing_creates_no_job(pool: PgPool) {
    let project = seed_project(&pool, "no-print", false).await;
    let photo = seed_photo(&pool, project.id, "np/1.jpg", Some("https://cdn.example.com/np/1.jpg")).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/print-jobs",
        json!({ "project_slug": "no-print", "photo_id": photo.id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PRINTING_DISABLED");
    assert_eq!(json["error"], "Printing is disabled for this project");
    assert_eq!(print_job_count(&pool).await, 0);
    let photo = PhotoRepo::find_by_id(&pool, photo.id).await.unwrap().unwrap();
    assert!(photo.print_status().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_project_or_foreign_photo_is_404(pool: PgPool) {
    seed_project(&pool, "gala", true).await;
    let wedding = seed_project(&pool, "wedding", true).await;
    let foreign = seed_photo(&pool, wedding.id, "w/1.jpg", Some("https://cdn.example.com/w/1.jpg")).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/print-jobs",
        json!({ "project_slug": "missing", "photo_id": foreign.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/print-jobs",
        json!({ "project_slug": "gala", "photo_id": foreign.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/print-jobs",
        json!({ "project_slug": "gala", "photo_id": 999_999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(print_job_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn copies_out_of_range_is_rejected(pool: PgPool) {
    let project = seed_project(&pool, "copies", true).await;
    let photo = seed_photo(&pool, project.id, "c/1.jpg", Some("https://cdn.example.com/c/1.jpg")).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/print-jobs",
        json!({ "project_slug": "copies", "photo_id": photo.id, "copies": 5 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(print_job_count(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Agent authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_without_valid_key_is_401(pool: PgPool) {
    let response = post_with_key(common::build_test_app(pool.clone()), CLAIM, None, "agent", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_with_key(
        common::build_test_app(pool.clone()),
        CLAIM,
        Some("wrong-key"),
        "agent",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unconfigured_key_rejects_every_agent(pool: PgPool) {
    let mut config = common::test_config();
    config.print_agent_key = None;
    let app = common::app_for(common::test_state_with(pool, config));

    let response = post_with_key(app, CLAIM, Some(TEST_AGENT_KEY), "agent", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_requires_agent_key(pool: PgPool) {
    let response = post_with_key(
        common::build_test_app(pool),
        "/api/v1/print-jobs/1/complete",
        None,
        "agent",
        Some(json!({ "attempt": 1, "status": "done" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Unresolvable images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn photo_without_url_is_failed_server_side(pool: PgPool) {
    let project = seed_project(&pool, "no-url", true).await;
    let photo = seed_photo(&pool, project.id, "nu/1.jpg", None).await;
    let job_id = request_print(common::build_test_app(pool.clone()), "no-url", photo.id).await;

    let response = post_agent(common::build_test_app(pool.clone()), CLAIM, "agent", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());

    let job = PrintJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status(), Some(PrintJobStatus::Error));
    assert_eq!(job.error_message.as_deref(), Some("Missing image URL"));
    let photo = PhotoRepo::find_by_id(&pool, photo.id).await.unwrap().unwrap();
    assert_eq!(photo.print_status(), Some(PrintJobStatus::Error));
}

struct BrokenResolver;

#[async_trait]
impl ImageUrlResolver for BrokenResolver {
    async fn resolve(&self, _location: PhotoLocation<'_>) -> Result<Option<String>, CoreError> {
        Err(CoreError::Internal("signing backend unavailable".into()))
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolver_failure_never_reaches_agent(pool: PgPool) {
    let project = seed_project(&pool, "broken", true).await;
    let photo = seed_photo(&pool, project.id, "b/1.jpg", None).await;
    let job_id = request_print(common::build_test_app(pool.clone()), "broken", photo.id).await;

    let state = common::test_state_with_resolver(
        pool.clone(),
        common::test_config(),
        Arc::new(BrokenResolver),
    );
    let response = post_agent(common::app_for(state), CLAIM, "agent", None).await;
    assert!(body_json(response).await["data"].is_null());

    let job = PrintJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.error_message.as_deref(), Some("Missing image URL"));
}

// ---------------------------------------------------------------------------
// Completion guard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_by_non_holder_is_409(pool: PgPool) {
    let project = seed_project(&pool, "guard", true).await;
    let photo = seed_photo(&pool, project.id, "g/1.jpg", Some("https://cdn.example.com/g/1.jpg")).await;
    let job_id = request_print(common::build_test_app(pool.clone()), "guard", photo.id).await;
    let uri = format!("/api/v1/print-jobs/{job_id}/complete");

    post_agent(common::build_test_app(pool.clone()), CLAIM, "booth-1", None).await;

    let response = post_agent(
        common::build_test_app(pool.clone()),
        &uri,
        "booth-2",
        Some(json!({ "attempt": 1, "status": "done" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    let job = PrintJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status(), Some(PrintJobStatus::Printing));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_completion_is_idempotent(pool: PgPool) {
    let project = seed_project(&pool, "repeat", true).await;
    let photo = seed_photo(&pool, project.id, "r/1.jpg", Some("https://cdn.example.com/r/1.jpg")).await;
    let job_id = request_print(common::build_test_app(pool.clone()), "repeat", photo.id).await;
    let uri = format!("/api/v1/print-jobs/{job_id}/complete");

    post_agent(common::build_test_app(pool.clone()), CLAIM, "agent", None).await;
    for _ in 0..2 {
        let response = post_agent(
            common::build_test_app(pool.clone()),
            &uri,
            "agent",
            Some(json!({ "attempt": 1, "status": "done" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["status"], "DONE");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_job_is_404(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/print-jobs/424242").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_agent(
        common::build_test_app(pool),
        "/api/v1/print-jobs/424242/complete",
        "agent",
        Some(json!({ "attempt": 1, "status": "done" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_completion_status_is_rejected(pool: PgPool) {
    let response = post_agent(
        common::build_test_app(pool),
        "/api/v1/print-jobs/1/complete",
        "agent",
        Some(json!({ "attempt": 1, "status": "DONE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_without_attempt_is_rejected(pool: PgPool) {
    let response = post_agent(
        common::build_test_app(pool),
        "/api/v1/print-jobs/1/complete",
        "agent",
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Feed publication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_changes_reach_feed_subscribers(pool: PgPool) {
    let project = seed_project(&pool, "live", true).await;
    let photo = seed_photo(&pool, project.id, "l/1.jpg", Some("https://cdn.example.com/l/1.jpg")).await;
    let state = common::test_state(pool.clone());
    let mut subscription = state.feed.subscribe(project.id).await;

    let job_id = request_print(common::app_for(state.clone()), "live", photo.id).await;
    post_agent(common::app_for(state.clone()), CLAIM, "agent", None).await;

    let expected = |status: &str| FeedEvent::PrintStatus {
        job_id,
        photo_id: photo.id,
        status: status.to_string(),
    };
    assert_eq!(subscription.recv().await.unwrap(), expected("QUEUED"));
    assert_eq!(subscription.recv().await.unwrap(), expected("PRINTING"));

    state.feed.unsubscribe(subscription).await;
    assert_eq!(state.feed.channel_count().await, 0);
}
