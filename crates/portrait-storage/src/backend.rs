//! Storage backend trait

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Component, Path};

use crate::error::StorageError;

/// Directory (relative to the storage root) that holds user photos
pub const USER_PHOTO_DIR: &str = "images/user";

/// Storage backend trait
///
/// Implementations store opaque objects under relative paths.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write an object, replacing any previous content; returns the stored path
    async fn write(&self, path: &str, data: Bytes) -> Result<String, StorageError>;

    /// Delete an object; `Ok(false)` if it did not exist
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}

/// Build the object path for a user's photo upload
///
/// Layout: `images/user/{user_id}_{MMDDYYHHMMSS}.{ext}`
pub fn photo_object_path(user_id: i64, uploaded_at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}/{}_{}.{}",
        USER_PHOTO_DIR,
        user_id,
        uploaded_at.format("%m%d%y%H%M%S"),
        extension
    )
}

/// Reject absolute paths and any path that could escape the storage root
pub fn validate_object_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty() {
        return Err(StorageError::InvalidPath("empty path".to_string()));
    }

    let all_normal = Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !all_normal {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}
