//! Vidhub persistence layer
//!
//! Repository traits for users and videos, their PostgreSQL implementations, and the
//! `Database` handle that owns the connection pool.

pub mod database;
pub mod db;
pub mod repository;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use database::{Database, DatabaseSettings};
pub use db::{PgUserRepository, PgVideoRepository};
pub use repository::{UserRepository, VideoRepository};
