//! Login endpoint.

use axum::{extract::State, Json};

use super::JsonBody;
use crate::auth::{issue_token, verify_password};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::models::{LoginRequest, LoginResponse};
use crate::AppState;

/// POST /api/auth/login - Exchange admin credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppErrorWithRevision> {
    let Some(secret) = state.config.jwt_secret.as_deref() else {
        return Err(AppError::Internal("Token signing is not configured".to_string()).into());
    };

    let user = state.repo.find_user_by_username(&request.username).await?;

    // Same answer for unknown user and wrong password
    let user = match user {
        Some(user) if verify_password(&user.password_hash, &request.password) => user,
        _ => {
            tracing::info!(username = %request.username, "Rejected login");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()).into());
        }
    };

    let token = issue_token(
        &user.id,
        &user.username,
        secret,
        state.config.token_ttl_hours,
    )?;
    tracing::info!(username = %user.username, "Issued admin token");

    Ok(Json(LoginResponse { token }))
}
