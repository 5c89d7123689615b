//! Handlers for `/projects/{slug}/photos`.
//!
//! Photos arrive already uploaded to the bucket; registering one records
//! its key and announces it on the project's live feed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photobooth_core::error::CoreError;
use photobooth_core::feed::FeedEvent;
use photobooth_core::project::{public_url_for, validate_storage_key};
use photobooth_core::types::{DbId, Timestamp};
use photobooth_db::models::photo::{CreatePhoto, Photo};
use photobooth_db::models::project::Project;
use photobooth_db::repositories::photo_repo::RECENT_PHOTOS_LIMIT;
use photobooth_db::repositories::{PhotoRepo, ProjectRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /projects/{slug}/photos`.
#[derive(Debug, Deserialize)]
pub struct RegisterPhoto {
    pub storage_key: String,
    pub is_public: Option<bool>,
}

/// A photo as shown to the booth and screen views.
#[derive(Debug, Serialize)]
pub struct PhotoView {
    pub id: DbId,
    pub image_url: Option<String>,
    pub is_public: bool,
    pub print_status: Option<&'static str>,
    pub created_at: Timestamp,
}

async fn find_project(state: &AppState, slug: &str) -> AppResult<Project> {
    ProjectRepo::find_by_slug(&state.pool, slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Project",
                key: slug.to_string(),
            })
        })
}

/// Resolve a display URL. Resolution failures degrade to `None`.
async fn view(state: &AppState, photo: Photo) -> PhotoView {
    let image_url = match state.image_urls.resolve(photo.location()).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(photo_id = photo.id, error = %e, "Photo URL resolution failed");
            None
        }
    };
    PhotoView {
        id: photo.id,
        image_url,
        is_public: photo.is_public,
        print_status: photo.print_status().map(|s| s.name()),
        created_at: photo.created_at,
    }
}

/// GET /api/v1/projects/{slug}/photos
///
/// The most recent public photos, newest first.
pub async fn list_photos(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let project = find_project(&state, &slug).await?;
    let photos = PhotoRepo::list_recent_public(&state.pool, project.id, RECENT_PHOTOS_LIMIT).await?;

    let mut data = Vec::with_capacity(photos.len());
    for photo in photos {
        data.push(view(&state, photo).await);
    }
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{slug}/photos
///
/// Register an uploaded photo. Public photos get a CDN URL when one is
/// configured and are published to the feed.
pub async fn register_photo(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<RegisterPhoto>,
) -> AppResult<impl IntoResponse> {
    validate_storage_key(&input.storage_key)?;
    let project = find_project(&state, &slug).await?;

    // Private photos are only ever served through a signed URL.
    let is_public = input.is_public.unwrap_or(true);
    let public_url = if is_public {
        public_url_for(
            state.config.storage.public_base_url.as_deref(),
            &input.storage_key,
        )
    } else {
        None
    };
    let photo = PhotoRepo::create(
        &state.pool,
        &CreatePhoto {
            project_id: project.id,
            storage_key: input.storage_key,
            public_url,
            is_public: Some(is_public),
        },
    )
    .await?;

    tracing::info!(photo_id = photo.id, project_id = project.id, "Photo registered");

    let is_public = photo.is_public;
    let photo = view(&state, photo).await;
    if is_public {
        state
            .feed
            .publish(
                project.id,
                FeedEvent::PhotoNew {
                    photo_id: photo.id,
                    image_url: photo.image_url.clone(),
                    created_at: photo.created_at,
                },
            )
            .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}
