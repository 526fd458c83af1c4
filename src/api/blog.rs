//! Blog API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult, JsonBody};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::models::{BlogPost, CreateBlogPostRequest, UpdateBlogPostRequest};
use crate::AppState;

/// GET /api/blog - List blog posts as a bare array.
pub async fn list_blog_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPost>>, AppErrorWithRevision> {
    Ok(Json(state.repo.list_blog_posts().await?))
}

/// GET /api/blog/:id - Get a single post.
pub async fn get_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BlogPost> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_blog_post(&id).await {
        Ok(Some(post)) => success(post, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Blog post {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/blog - Publish a post.
pub async fn create_blog_post(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateBlogPostRequest>,
) -> ApiResult<BlogPost> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.title.trim().is_empty() {
        return error(
            AppError::Validation("Post title is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_blog_post(&request).await {
        Ok(post) => {
            tracing::info!("Published blog post '{}'", post.title);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(post, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/blog/:id - Update a post.
pub async fn update_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateBlogPostRequest>,
) -> ApiResult<BlogPost> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if matches!(request.title.as_deref(), Some(title) if title.trim().is_empty()) {
        return error(
            AppError::Validation("Post title cannot be empty".to_string()),
            revision_id,
        );
    }

    match state.repo.update_blog_post(&id, &request).await {
        Ok(post) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(post, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/blog/:id - Delete a post.
pub async fn delete_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_blog_post(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
