//! Media store setup

use anyhow::{Context, Result};
use std::sync::Arc;
use vidhub_core::Config;
use vidhub_storage::{create_media_store, MediaStore};

pub async fn setup_media_store(config: &Config) -> Result<Arc<dyn MediaStore>> {
    tracing::info!(backend = ?config.storage_backend(), "Initializing media store");

    let media = create_media_store(config)
        .await
        .context("Failed to initialize media store")?;

    Ok(media)
}
