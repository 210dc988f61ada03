//! Authentication error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("User not found")]
    UserNotFound,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Cipher error: {0}")]
    Cipher(String),

    /// Token signing failure; decoding failures surface as `InvalidToken`
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] portrait_db::DbError),
}

impl AuthError {
    /// Whether the error is the caller's fault (bad or missing credentials)
    /// rather than a server-side failure
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AuthError::PasswordHash(_)
                | AuthError::Cipher(_)
                | AuthError::Jwt(_)
                | AuthError::Database(_)
        )
    }
}
