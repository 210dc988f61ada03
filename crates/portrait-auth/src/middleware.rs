//! Bearer-token verification
//!
//! Resolves an `Authorization: Bearer <jwt>` header to the user row the
//! token was issued for.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use portrait_db::{Database, User};
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::JwtManager;

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Authenticate a request from its headers
///
/// Verifies signature and expiry, decrypts the subject, and looks the
/// user up. A token for a user that no longer exists is rejected.
pub async fn authenticate(
    headers: &HeaderMap,
    jwt: &JwtManager,
    db: &Database,
) -> Result<User, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = extract_bearer_token(header)?;
    let user_id = jwt.verify(token)?;

    let user = db
        .get_user_by_id(user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    debug!("Authenticated user: {} ({})", user.username, user.id);
    Ok(user)
}
