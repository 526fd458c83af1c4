//! Revision API endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::errors::AppErrorWithRevision;
use crate::models::RevisionInfo;
use crate::AppState;

/// GET /api/revision - Get the current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let revision_info = state
        .repo
        .get_revision_info()
        .await
        .map_err(AppErrorWithRevision::from)?;

    success(revision_info.clone(), revision_info.revision_id)
}
