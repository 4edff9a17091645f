//! Vidhub Core Library
//!
//! This crate provides the domain models, error types, configuration, and request
//! validation shared by the storage, database, and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
