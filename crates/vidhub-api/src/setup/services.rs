//! Repositories, token service and the asset cleanup worker.

use crate::auth::TokenService;
use crate::services::{AssetCleanupService, AssetCleanupSettings, AssetCleanupWorker};
use crate::state::AppState;
use std::sync::Arc;
use vidhub_core::Config;
use vidhub_db::{Database, PgUserRepository, PgVideoRepository};
use vidhub_storage::MediaStore;

/// Wire the PostgreSQL repositories and start background services.
///
/// The returned worker must be shut down after the server stops so queued asset
/// deletions are drained.
pub fn initialize_services(
    config: &Config,
    database: Database,
    media: Arc<dyn MediaStore>,
) -> (Arc<AppState>, AssetCleanupWorker) {
    let users = Arc::new(PgUserRepository::new(database.pool().clone()));
    let videos = Arc::new(PgVideoRepository::new(database.pool().clone()));

    let (cleanup, worker) =
        AssetCleanupService::start(media.clone(), AssetCleanupSettings::from(config));

    let state = Arc::new(AppState {
        config: config.clone(),
        users,
        videos,
        media,
        database: Some(database),
        cleanup,
        tokens: TokenService::new(config.auth()),
    });

    tracing::info!("Services initialized");
    (state, worker)
}
