//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::services::AssetCleanupWorker;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vidhub_core::Config;

/// A fully wired application, ready to serve.
pub struct App {
    pub state: Arc<AppState>,
    pub router: axum::Router,
    pub cleanup_worker: AssetCleanupWorker,
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<App> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let database = database::setup_database(&config).await?;
    let media = storage::setup_media_store(&config).await?;

    let (state, cleanup_worker) = services::initialize_services(&config, database, media);

    let router = routes::setup_routes(state.clone())?;

    Ok(App {
        state,
        router,
        cleanup_worker,
    })
}
