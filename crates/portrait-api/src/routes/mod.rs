//! API routes

mod auth;
mod health;
pub mod metrics;
mod photos;
pub mod types;
mod users;
pub mod validation;

use axum::{Router, extract::DefaultBodyLimit};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::state::{AppState, MetricsHandle};

pub use auth::CurrentUser;

/// Headroom on top of the photo size limit for the rest of a multipart body
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the main router
///
/// `storage_root` is the local storage directory; its `images` subtree is
/// served under `/images`.
pub fn create_router(
    state: AppState,
    storage_root: impl AsRef<Path>,
    metrics_handle: Option<Arc<MetricsHandle>>,
) -> Router {
    let body_limit = state.upload.max_file_size + FORM_OVERHEAD_BYTES;

    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Accounts
        .merge(auth::routes())
        .merge(users::routes())
        // Photos
        .merge(photos::routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        // Uploaded photos
        .nest_service("/images", ServeDir::new(storage_root.as_ref().join("images")));

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
