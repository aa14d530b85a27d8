//! Local filesystem storage backend.

use super::{StorageBackend, StorageError};
use actix_web::web;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

/// Local filesystem storage backend.
pub struct LocalStorage {
    /// Base path for file storage
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend.
    ///
    /// The `base_path` directory will be created if it doesn't exist.
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        // Create base directory if it doesn't exist
        fs::create_dir_all(&base_path)?;
        log::info!("LocalStorage initialized at {:?}", base_path);
        Ok(Self { base_path })
    }

    /// Get the full path for a file, including prefix directories.
    fn get_file_path(&self, filename: &str) -> PathBuf {
        if filename.len() < 4 {
            // Fallback for short filenames
            self.base_path.join(filename)
        } else {
            let prefix1 = &filename[0..2];
            let prefix2 = &filename[2..4];
            self.base_path.join(prefix1).join(prefix2).join(filename)
        }
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn put_object(&self, data: Vec<u8>, filename: &str) -> Result<(), StorageError> {
        let path = self.get_file_path(filename);
        log::info!("LocalStorage: put_object: {:?}", path);

        // Use web::block for blocking file operations
        web::block(move || {
            // Create parent directories
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            // Write file
            fs::write(&path, data)
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        Ok(())
    }

    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.get_file_path(filename);
        Ok(path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_put_object_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf()).unwrap();

        assert!(!storage.exists("aabbccdd.bin").await.unwrap());

        storage
            .put_object(b"payload".to_vec(), "aabbccdd.bin")
            .await
            .unwrap();

        assert!(storage.exists("aabbccdd.bin").await.unwrap());
        // Stored under the two-level prefix tree
        let on_disk = dir.path().join("aa").join("bb").join("aabbccdd.bin");
        assert_eq!(fs::read(on_disk).unwrap(), b"payload");
    }

    #[actix_rt::test]
    async fn test_short_names_fall_back_to_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_path_buf()).unwrap();

        storage.put_object(b"x".to_vec(), "abc").await.unwrap();
        assert!(dir.path().join("abc").is_file());
    }
}
