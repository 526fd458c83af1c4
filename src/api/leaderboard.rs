//! Leaderboard API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error, success, ApiResult, JsonBody};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::models::{
    CreateEntryRequest, LeaderboardEntry, LeaderboardPage, LeaderboardParams, LeaderboardQuery,
    UpdateEntryRequest,
};
use crate::AppState;

/// GET /api/leaderboard - One page of ranked entries.
///
/// Malformed paging or sort parameters are defaulted, never rejected.
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardPage>, AppErrorWithRevision> {
    let query = LeaderboardQuery::from(params);
    let page = state.repo.leaderboard(&query).await?;
    Ok(Json(page))
}

/// GET /api/leaderboard/:id - Get a single entry.
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LeaderboardEntry> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_entry(&id).await {
        Ok(Some(entry)) => success(entry, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Entry {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/leaderboard - Create a new entry.
pub async fn create_entry(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateEntryRequest>,
) -> ApiResult<LeaderboardEntry> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_entry(&request).await {
        Ok(entry) => {
            tracing::info!("Created leaderboard entry for {} ({})", entry.name, entry.department);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/leaderboard/:id - Update an entry.
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateEntryRequest>,
) -> ApiResult<LeaderboardEntry> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if matches!(request.name.as_deref(), Some(name) if name.trim().is_empty()) {
        return error(
            AppError::Validation("Name cannot be empty".to_string()),
            revision_id,
        );
    }

    match state.repo.update_entry(&id, &request).await {
        Ok(entry) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/leaderboard/:id - Delete an entry.
pub async fn delete_entry(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_entry(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
