//! Portrait REST API
//!
//! This crate provides the Axum-based HTTP API: account registration and
//! login, profile management, and the single-photo-per-user endpoints.

pub mod error;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use response::ApiResponse;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle, UploadLimits};
