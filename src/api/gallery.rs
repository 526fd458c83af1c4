//! Gallery API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult, JsonBody};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::models::{CreateGalleryItemRequest, GalleryItem, UpdateGalleryItemRequest};
use crate::AppState;

/// GET /api/gallery - List gallery items as a bare array.
pub async fn list_gallery(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryItem>>, AppErrorWithRevision> {
    Ok(Json(state.repo.list_gallery().await?))
}

/// GET /api/gallery/:id
pub async fn get_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<GalleryItem> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_gallery_item(&id).await {
        Ok(Some(item)) => success(item, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Gallery item {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/gallery
pub async fn create_gallery_item(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateGalleryItemRequest>,
) -> ApiResult<GalleryItem> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.title.trim().is_empty() {
        return error(
            AppError::Validation("Gallery title is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_gallery_item(&request).await {
        Ok(item) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(item, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/gallery/:id
pub async fn update_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateGalleryItemRequest>,
) -> ApiResult<GalleryItem> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if matches!(request.title.as_deref(), Some(title) if title.trim().is_empty()) {
        return error(
            AppError::Validation("Gallery title cannot be empty".to_string()),
            revision_id,
        );
    }

    match state.repo.update_gallery_item(&id, &request).await {
        Ok(item) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(item, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/gallery/:id
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_gallery_item(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
