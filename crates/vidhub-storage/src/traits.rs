//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the media
/// store adapter can work with any of them.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Copy the file at `local_path` to `storage_key` and return its public URL.
    async fn upload_file(
        &self,
        storage_key: &str,
        local_path: &Path,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete a file by its storage key. Deleting a missing key succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Map a public URL issued by this backend back to its storage key.
    /// Returns `None` for URLs that belong elsewhere.
    fn key_for_url(&self, url: &str) -> Option<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
