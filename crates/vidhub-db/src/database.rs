//! Database handle: connection pool lifecycle and migrations.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;
use vidhub_core::Config;

/// Connection settings for [`Database::connect`].
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl From<&Config> for DatabaseSettings {
    fn from(config: &Config) -> Self {
        Self {
            url: config.database_url().to_string(),
            max_connections: config.db_max_connections(),
            acquire_timeout: Duration::from_secs(config.db_timeout_seconds()),
        }
    }
}

/// Owned connection pool. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&settings.url)
            .await
            .context("Failed to connect to database")?;

        tracing::info!(
            max_connections = settings.max_connections,
            "Database connected successfully"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations from the workspace `migrations/` directory.
    pub async fn migrate(&self) -> Result<()> {
        let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        let migrator = sqlx::migrate::Migrator::new(migrations_dir)
            .await
            .context("Failed to load migrations")?;
        migrator
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
