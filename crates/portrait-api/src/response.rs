//! JSON response envelope
//!
//! Every response body, success or failure, has the shape
//! `{"message", "code", "status", "data"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Serialized envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub code: u16,
    pub status: &'static str,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status_code: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            code: status_code.as_u16(),
            status: if status_code.is_success() {
                "success"
            } else {
                "error"
            },
            data,
        }
    }
}

/// Successful API response
pub struct ApiResponse<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a payload
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::new(StatusCode::OK, message, Some(data)),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
