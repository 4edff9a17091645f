//! PostgreSQL repositories
//!
//! Each repository owns a clone of the pool and implements one of the traits in
//! `crate::repository`.

pub mod listing;
pub mod user;
pub mod video;

pub use user::PgUserRepository;
pub use video::PgVideoRepository;
