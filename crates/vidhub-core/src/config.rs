//! Configuration module
//!
//! This module provides configuration structures for the API and its collaborators,
//! including database, storage, authentication, upload limits and asset cleanup.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 60;
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 10;
const MAX_VIDEO_SIZE_MB: usize = 500;
const MAX_IMAGE_SIZE_MB: usize = 10;
const MEDIA_STORE_TIMEOUT_SECS: u64 = 120;
const ASSET_CLEANUP_MAX_RETRIES: u32 = 3;
const ASSET_CLEANUP_RETRY_DELAY_MS: u64 = 2000;
const MIN_SECRET_LEN: usize = 32;

/// Base configuration shared by every part of the service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Token signing configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub access_token_secret: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_secret: String,
    pub refresh_token_expiry_days: i64,
}

/// Full service configuration
#[derive(Clone, Debug)]
pub struct VidhubConfig {
    pub base: BaseConfig,
    pub auth: AuthConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload handling
    pub ffprobe_path: String,
    pub upload_temp_dir: PathBuf,
    pub max_video_size_bytes: usize,
    pub max_image_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
    pub image_allowed_extensions: Vec<String>,
    pub media_store_timeout_secs: u64,
    // Background asset cleanup
    pub asset_cleanup_max_retries: u32,
    pub asset_cleanup_retry_delay_ms: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<VidhubConfig>);

impl Config {
    fn inner(&self) -> &VidhubConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = VidhubConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    /// Build configuration from an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config(Box::new(VidhubConfig::from_lookup(lookup)?)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.inner().auth
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    pub fn upload_temp_dir(&self) -> &PathBuf {
        &self.inner().upload_temp_dir
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.inner().max_video_size_bytes
    }

    pub fn max_image_size_bytes(&self) -> usize {
        self.inner().max_image_size_bytes
    }

    pub fn video_allowed_extensions(&self) -> &[String] {
        &self.inner().video_allowed_extensions
    }

    pub fn image_allowed_extensions(&self) -> &[String] {
        &self.inner().image_allowed_extensions
    }

    pub fn media_store_timeout_secs(&self) -> u64 {
        self.inner().media_store_timeout_secs
    }

    pub fn asset_cleanup_max_retries(&self) -> u32 {
        self.inner().asset_cleanup_max_retries
    }

    pub fn asset_cleanup_retry_delay_ms(&self) -> u64 {
        self.inner().asset_cleanup_retry_delay_ms
    }

    /// Largest request body the router must accept: one video plus one thumbnail
    /// and some headroom for the text fields.
    pub fn max_request_body_bytes(&self) -> usize {
        self.max_video_size_bytes()
            .saturating_add(self.max_image_size_bytes())
            .saturating_add(1024 * 1024)
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_list(raw: String) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl VidhubConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .unwrap_or(SERVER_PORT),
            cors_origins,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let auth = AuthConfig {
            access_token_secret: lookup("ACCESS_TOKEN_SECRET")
                .ok_or_else(|| anyhow::anyhow!("ACCESS_TOKEN_SECRET must be set"))?,
            access_token_expiry_minutes: lookup("ACCESS_TOKEN_EXPIRY_MINUTES")
                .unwrap_or_else(|| ACCESS_TOKEN_EXPIRY_MINUTES.to_string())
                .parse()
                .unwrap_or(ACCESS_TOKEN_EXPIRY_MINUTES),
            refresh_token_secret: lookup("REFRESH_TOKEN_SECRET")
                .ok_or_else(|| anyhow::anyhow!("REFRESH_TOKEN_SECRET must be set"))?,
            refresh_token_expiry_days: lookup("REFRESH_TOKEN_EXPIRY_DAYS")
                .unwrap_or_else(|| REFRESH_TOKEN_EXPIRY_DAYS.to_string())
                .parse()
                .unwrap_or(REFRESH_TOKEN_EXPIRY_DAYS),
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let max_video_size_mb = lookup("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let max_image_size_mb = lookup("MAX_IMAGE_SIZE_MB")
            .unwrap_or_else(|| MAX_IMAGE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_IMAGE_SIZE_MB);

        Ok(Self {
            base,
            auth,
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            upload_temp_dir: lookup("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            max_image_size_bytes: max_image_size_mb * 1024 * 1024,
            video_allowed_extensions: parse_list(
                lookup("VIDEO_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|| "mp4,mov,avi,webm,mkv".to_string()),
            ),
            image_allowed_extensions: parse_list(
                lookup("IMAGE_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|| "jpg,jpeg,png,gif,webp".to_string()),
            ),
            media_store_timeout_secs: lookup("MEDIA_STORE_TIMEOUT_SECS")
                .unwrap_or_else(|| MEDIA_STORE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(MEDIA_STORE_TIMEOUT_SECS),
            asset_cleanup_max_retries: lookup("ASSET_CLEANUP_MAX_RETRIES")
                .unwrap_or_else(|| ASSET_CLEANUP_MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(ASSET_CLEANUP_MAX_RETRIES),
            asset_cleanup_retry_delay_ms: lookup("ASSET_CLEANUP_RETRY_DELAY_MS")
                .unwrap_or_else(|| ASSET_CLEANUP_RETRY_DELAY_MS.to_string())
                .parse()
                .unwrap_or(ASSET_CLEANUP_RETRY_DELAY_MS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.auth.access_token_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "ACCESS_TOKEN_SECRET must be at least 32 characters long"
            ));
        }

        if self.auth.refresh_token_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "REFRESH_TOKEN_SECRET must be at least 32 characters long"
            ));
        }

        if self.auth.access_token_secret == self.auth.refresh_token_secret {
            return Err(anyhow::anyhow!(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.video_allowed_extensions.is_empty() || self.image_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_EXTENSIONS and IMAGE_ALLOWED_EXTENSIONS must not be empty"
            ));
        }

        // Validate storage backend configuration
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
