//! Application state shared by every handler.
//!
//! Persistence and the media store sit behind traits so the router can run over the
//! PostgreSQL repositories in production and in-memory ones in tests.

use crate::auth::TokenService;
use crate::services::asset_cleanup::AssetCleanupHandle;
use std::sync::Arc;
use std::time::Duration;
use vidhub_core::Config;
use vidhub_db::{Database, UserRepository, VideoRepository};
use vidhub_storage::MediaStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserRepository>,
    pub videos: Arc<dyn VideoRepository>,
    pub media: Arc<dyn MediaStore>,
    /// Live pool for readiness checks; absent when running over in-memory repositories
    pub database: Option<Database>,
    pub cleanup: AssetCleanupHandle,
    pub tokens: TokenService,
}

impl AppState {
    /// Upper bound for a single media store call.
    pub fn media_timeout(&self) -> Duration {
        Duration::from_secs(self.config.media_store_timeout_secs())
    }
}
