//! Application state

use portrait_auth::JwtManager;
use portrait_db::Database;
use portrait_storage::StorageBackend;
use std::sync::Arc;

/// Prometheus exporter handle rendered by `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Limits applied to photo uploads
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Largest accepted photo, in bytes
    pub max_file_size: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub storage: Arc<dyn StorageBackend>,
    pub jwt: Arc<JwtManager>,
    pub upload: UploadLimits,
}

impl AppState {
    pub fn new(
        db: Database,
        storage: Arc<dyn StorageBackend>,
        jwt: Arc<JwtManager>,
        upload: UploadLimits,
    ) -> Self {
        Self {
            db,
            storage,
            jwt,
            upload,
        }
    }
}
