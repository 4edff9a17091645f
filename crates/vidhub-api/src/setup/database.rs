//! Database connection and migrations

use anyhow::{Context, Result};
use vidhub_core::Config;
use vidhub_db::{Database, DatabaseSettings};

pub async fn setup_database(config: &Config) -> Result<Database> {
    let database = Database::connect(&DatabaseSettings::from(config))
        .await
        .context("Failed to connect to database")?;

    database
        .migrate()
        .await
        .context("Failed to apply database migrations")?;

    Ok(database)
}
