//! Bearer-token authentication for admin writes.
//!
//! Tokens are HS256 JWTs carrying the admin's id and username. Passwords are
//! stored as argon2 PHC strings.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{codes, AppError, ErrorDetails, ErrorResponse};

/// Claims carried by an admin token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

/// Hash a password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string. A malformed hash never verifies.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Sign a token for a user, valid for `ttl_hours`.
pub fn issue_token(
    user_id: &str,
    username: &str,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let expiration = chrono::Duration::try_hours(ttl_hours)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::Internal(format!("Token lifetime of {} hours is out of range", ttl_hours))
        })?;
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Validate signature and expiry of a token.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// JWT authentication layer function that takes the signing secret as a parameter.
///
/// Missing credentials get 401, a token that fails verification gets 403.
pub async fn jwt_auth_layer(secret: Option<String>, mut request: Request, next: Next) -> Response {
    // If no secret is configured, allow all requests (dev mode)
    let Some(secret) = secret else {
        return next.run(request).await;
    };

    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string());

    let Some(token) = bearer.filter(|t| !t.is_empty()) else {
        return auth_failure(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, "Missing bearer token");
    };

    match verify_token(&token, &secret) {
        Ok(claims) => {
            tracing::debug!(user = %claims.username, "Authenticated admin request");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(_) => auth_failure(StatusCode::FORBIDDEN, codes::FORBIDDEN, "Invalid or expired token"),
    }
}

fn auth_failure(status: StatusCode, code: &str, message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("Password1!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "Password1!"));
        assert!(!verify_password(&hash, "Password2!"));
    }

    #[test]
    fn test_malformed_hash_rejects() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn test_token_claims() {
        let token = issue_token("user-1", "admin1", SECRET, 8).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "admin1");
    }

    #[test]
    fn test_token_wrong_secret() {
        let token = issue_token("user-1", "admin1", SECRET, 8).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_token_expired() {
        // well past the default validation leeway
        let token = issue_token("user-1", "admin1", SECRET, -2).unwrap();
        assert!(matches!(
            verify_token(&token, SECRET),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_token_lifetime_out_of_range() {
        for ttl in [i64::MAX, 1_000_000_000_000] {
            assert!(matches!(
                issue_token("user-1", "admin1", SECRET, ttl),
                Err(AppError::Internal(_))
            ));
        }
    }

    #[test]
    fn test_garbage_token() {
        assert!(verify_token("abc.def.ghi", SECRET).is_err());
    }
}
