//! Event API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult, JsonBody};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::models::{CreateEventRequest, Event, UpdateEventRequest};
use crate::AppState;

/// GET /api/events - List all events as a bare array.
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<Event>>, AppErrorWithRevision> {
    Ok(Json(state.repo.list_events().await?))
}

/// GET /api/events/:id - Get a single event.
pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_event(&id).await {
        Ok(Some(event)) => success(event, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Event {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/events - Create a new event.
pub async fn create_event(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateEventRequest>,
) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.title.trim().is_empty() {
        return error(
            AppError::Validation("Event title is required".to_string()),
            revision_id,
        );
    }
    if matches!(request.capacity, Some(capacity) if capacity < 0) {
        return error(
            AppError::Validation("Capacity cannot be negative".to_string()),
            revision_id,
        );
    }

    match state.repo.create_event(&request).await {
        Ok(event) => {
            tracing::info!("Created event '{}'", event.title);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(event, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/events/:id - Update an event.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateEventRequest>,
) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if matches!(request.title.as_deref(), Some(title) if title.trim().is_empty()) {
        return error(
            AppError::Validation("Event title cannot be empty".to_string()),
            revision_id,
        );
    }

    match state.repo.update_event(&id, &request).await {
        Ok(event) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(event, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/events/:id - Delete an event.
pub async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_event(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
