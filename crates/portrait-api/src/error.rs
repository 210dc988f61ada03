//! API error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

use crate::response::Envelope;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or incomplete input (422)
    #[error("{message}: {errors:?}")]
    Validation { message: String, errors: Vec<String> },

    /// Request that cannot be served in the current state (400)
    #[error("{message}")]
    BadRequest { message: String, data: Option<Value> },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] portrait_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] portrait_auth::AuthError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, errors: Vec<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            data: None,
        }
    }

    /// 400 carrying a payload, e.g. `{"is_uploaded": false}`
    pub fn bad_request_with(message: impl Into<String>, data: Value) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, data) = match self {
            ApiError::Validation { message, errors } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                message,
                Some(json!({ "errors": errors })),
            ),
            ApiError::BadRequest { message, data } => (StatusCode::BAD_REQUEST, message, data),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message, None),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    None,
                )
            }
            ApiError::Database(e) => match e {
                portrait_db::DbError::NotFound(msg) | portrait_db::DbError::Duplicate(msg) => {
                    (StatusCode::BAD_REQUEST, msg, None)
                }
                _ => {
                    error!("Database error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                        None,
                    )
                }
            },
            ApiError::Auth(e) => {
                if e.is_client_error() {
                    (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None)
                } else {
                    error!("Auth error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                        None,
                    )
                }
            }
        };

        (status, Json(Envelope::new(status, message, data))).into_response()
    }
}
