use std::io::ErrorKind;
use std::path::PathBuf;

use axum::body::Bytes;
use tracing::debug;

use super::{content_type_for, is_safe_key};
use crate::error::{ApiError, Result};
use crate::ports::{ImageStore, PortFuture, StoredObject};

/// Images as plain files under one directory.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// # Errors
    /// Returns an error if the root directory cannot be created.
    pub async fn create(root: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if is_safe_key(key) {
            Ok(self.root.join(key))
        } else {
            Err(ApiError::bad_request(format!("Invalid image key '{key}'")))
        }
    }
}

impl ImageStore for DiskStore {
    fn put<'a>(
        &'a self,
        key: &'a str,
        bytes: Bytes,
        _content_type: &'a str,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let path = self.resolve(key)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| ApiError::StorageError(format!("Failed to write {key}: {e}")))?;
            debug!(key, size = bytes.len(), "stored image on disk");
            Ok(())
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> PortFuture<'a, StoredObject> {
        Box::pin(async move {
            let path = self.resolve(key)?;
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(StoredObject {
                    bytes: Bytes::from(bytes),
                    content_type: content_type_for(key).to_string(),
                }),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(ApiError::not_found(format!("Image '{key}' not found")))
                }
                Err(e) => Err(ApiError::StorageError(format!("Failed to read {key}: {e}"))),
            }
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let path = self.resolve(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(key, "deleted image from disk");
                    Ok(())
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(ApiError::StorageError(format!(
                    "Failed to delete {key}: {e}"
                ))),
            }
        })
    }
}
