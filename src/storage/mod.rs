//! Image storage backends.
//!
//! Objects are addressed by keys of the form `<prefix>/<uuid>.<ext>`. The
//! database stores only the key; bytes live on local disk or in an
//! S3-compatible bucket depending on configuration.

mod disk;
mod s3;
mod sigv4;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

pub use disk::DiskStore;
pub use s3::S3Store;

use crate::config::StorageConfig;
use crate::error::{ApiError, Result};
use crate::ports::ImageStore;

pub const PRODUCT_PREFIX: &str = "products";
pub const STORY_PREFIX: &str = "stories";

const ALLOWED_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
];

/// # Errors
/// Returns an error if the S3 endpoint is not a valid URL or the uploads
/// directory cannot be created.
pub async fn from_config(config: &StorageConfig) -> Result<Arc<dyn ImageStore>> {
    match config {
        StorageConfig::Disk { uploads_dir } => {
            info!("Storing images on disk under {}", uploads_dir.display());
            Ok(Arc::new(DiskStore::create(uploads_dir.clone()).await?))
        }
        StorageConfig::S3(s3) => {
            info!("Storing images in bucket {} at {}", s3.bucket, s3.endpoint);
            Ok(Arc::new(S3Store::new(s3)?))
        }
    }
}

/// Lowercase extension of an uploaded filename, if it is an allowed image type.
#[must_use]
pub fn image_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| ALLOWED_EXTENSIONS.iter().any(|(allowed, _)| allowed == ext))
}

/// # Errors
/// Returns `BadRequest` when the filename has no allowed image extension.
pub fn object_key(prefix: &str, filename: &str) -> Result<String> {
    let ext = image_extension(filename).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Unsupported image type for '{filename}', expected one of: {}",
            ALLOWED_EXTENSIONS
                .iter()
                .map(|(ext, _)| *ext)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;
    Ok(format!("{prefix}/{}.{ext}", Uuid::new_v4()))
}

#[must_use]
pub fn content_type_for(key: &str) -> &'static str {
    image_extension(key)
        .and_then(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .find(|(allowed, _)| *allowed == ext)
                .map(|(_, content_type)| *content_type)
        })
        .unwrap_or("application/octet-stream")
}

/// Keys must be relative, non-empty and free of `.`/`..` segments.
#[must_use]
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Removes an object whose row no longer references it. Failures are logged only.
pub async fn delete_quietly(store: &dyn ImageStore, key: &str) {
    if let Err(e) = store.delete(key).await {
        warn!(key, "Failed to delete image: {e}");
    }
}
