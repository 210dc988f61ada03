//! Local disk storage backend

use async_trait::async_trait;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::backend::{StorageBackend, USER_PHOTO_DIR, validate_object_path};
use crate::error::StorageError;

/// Local disk storage backend
///
/// Objects live at `<base_path>/<relative path>`; the `images` subtree is
/// what the HTTP layer serves statically.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();

        fs::create_dir_all(base_path.join(USER_PHOTO_DIR)).await?;

        info!("Initialized local storage at {:?}", base_path);

        Ok(Self { base_path })
    }

    /// Get the file path for an object
    fn object_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        validate_object_path(path)?;
        Ok(self.base_path.join(path))
    }
}

/// Write `data` to a uniquely named temp file in `parent`, then rename it over `full`
///
/// Concurrent writers never share a temp file; the last rename wins.
fn write_atomic(parent: &Path, full: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(full).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn write(&self, path: &str, data: Bytes) -> Result<String, StorageError> {
        let full = self.object_path(path)?;
        debug!("Writing {} bytes to {:?}", data.len(), full);

        let parent = full
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;
        fs::create_dir_all(&parent).await?;

        tokio::task::spawn_blocking(move || write_atomic(&parent, &full, &data))
            .await
            .map_err(std::io::Error::other)??;

        Ok(path.to_string())
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.object_path(path)?;
        debug!("Deleting object at {:?}", full);

        match fs::remove_file(&full).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
