//! Storage backend abstraction for course media uploads.
//!
//! Uploads are written under a prefix tree derived from the stored filename
//! and served straight off disk by the static file handler, so the only
//! operations a backend needs are writing and existence checks.

pub mod local;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::path::PathBuf;

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// File not found
    NotFound(String),
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Trait for storage backends.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file.
    ///
    /// Files are stored with a prefix structure based on the filename:
    /// `{filename[0:2]}/{filename[2:4]}/{filename}`
    async fn put_object(&self, data: Vec<u8>, filename: &str) -> Result<(), StorageError>;

    /// Check if a file exists.
    async fn exists(&self, filename: &str) -> Result<bool, StorageError>;
}

static STORAGE: OnceCell<Box<dyn StorageBackend>> = OnceCell::new();

/// Initialize the storage backend from configuration.
/// Should be called once during application startup.
pub fn init() {
    let config = crate::app_config::storage();
    let backend = local::LocalStorage::new(PathBuf::from(&config.media_path))
        .expect("cannot initialize media storage");
    if STORAGE.set(Box::new(backend)).is_err() {
        log::warn!("storage initialized more than once");
    }
}

/// Get the configured storage backend.
pub fn backend() -> &'static dyn StorageBackend {
    STORAGE
        .get()
        .expect("storage::init() has not been called")
        .as_ref()
}

/// Relative URL path for a stored filename, mirroring the on-disk prefix
/// structure. Joined under the configured media URL by callers.
pub fn url_path(filename: &str) -> String {
    if filename.len() < 4 {
        filename.to_string()
    } else {
        format!("{}/{}/{}", &filename[0..2], &filename[2..4], filename)
    }
}

/// Generate a collision-free stored name for an upload, keeping a sanitized
/// version of the original extension.
pub fn generate_filename(original: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    match sanitize_extension(original) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id,
    }
}

/// Lowercased alphanumeric extension of an uploaded filename, if it has a
/// usable one. Stored names never take path fragments from user input.
pub fn sanitize_extension(original: &str) -> Option<String> {
    let ext = original.rsplit('.').next()?;
    if ext.is_empty() || ext.len() > 10 || ext == original {
        return None;
    }
    let ext = ext.to_lowercase();
    if ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}

/// Whether an extension is acceptable for image uploads.
pub fn is_image_extension(ext: &str) -> bool {
    matches!(
        ext,
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" | "avif"
    )
}
