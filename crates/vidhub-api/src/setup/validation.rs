//! Startup configuration checks beyond what parsing already enforces.

use anyhow::Result;
use vidhub_core::Config;

/// Fail fast on settings that would leave the service insecure or unable to run.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via the CORS_ORIGINS environment variable."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.media_store_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("MEDIA_STORE_TIMEOUT_SECS cannot be 0"));
    }

    Ok(())
}
