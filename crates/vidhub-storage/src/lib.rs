//! Vidhub Storage Library
//!
//! This crate provides the media store used by the upload and update workflows.
//! It includes the key-based `Storage` trait with S3 and local filesystem backends,
//! `ffprobe` duration probing, and the `MediaStore` seam the workflows depend on.
//!
//! # Storage key format
//!
//! All backends use the same key layout:
//!
//! - **Videos**: `videos/{uuid}.{ext}`
//! - **Images** (thumbnails, avatars, cover images): `images/{uuid}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Public URLs are `{base}/{key}`, which
//! lets a backend map a URL it issued back to its key.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod media_store;
pub mod probe;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_media_store, create_storage};
pub use keys::AssetKind;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use media_store::{MediaStore, MediaStoreAdapter, UploadedAsset};
pub use probe::{DurationProbe, FfprobeDurationProbe};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use vidhub_core::StorageBackend;
