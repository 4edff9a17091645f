//! Media store adapter: turns a local temporary file into a hosted asset.

use crate::keys::{generate_asset_key, AssetKind};
use crate::probe::DurationProbe;
use crate::traits::{Storage, StorageResult};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub key: String,
    pub url: String,
    /// Seconds; only reported for video assets
    pub duration: Option<f64>,
}

/// Upload and delete hosted assets.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload the file at `local_path`. The local file is consumed: it is removed
    /// once the upload attempt finishes, whatever the outcome.
    async fn upload(&self, local_path: &Path, kind: AssetKind) -> StorageResult<UploadedAsset>;

    /// Delete the asset behind `url`. `Ok(false)` when the URL is not one of ours
    /// or the asset is already gone.
    async fn delete(&self, url: &str) -> StorageResult<bool>;
}

/// `MediaStore` over any `Storage` backend.
pub struct MediaStoreAdapter {
    storage: Arc<dyn Storage>,
    probe: Arc<dyn DurationProbe>,
}

impl MediaStoreAdapter {
    pub fn new(storage: Arc<dyn Storage>, probe: Arc<dyn DurationProbe>) -> Self {
        Self { storage, probe }
    }

    async fn upload_inner(&self, local_path: &Path, kind: AssetKind) -> StorageResult<UploadedAsset> {
        let extension = local_path.extension().and_then(|e| e.to_str());
        let key = generate_asset_key(kind, extension);
        let content_type = mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .to_string();

        let duration = match kind {
            AssetKind::Video => match self.probe.probe_duration(local_path).await {
                Ok(duration) => duration,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Could not determine video duration");
                    None
                }
            },
            AssetKind::Image => None,
        };

        let url = self
            .storage
            .upload_file(&key, local_path, &content_type)
            .await?;

        Ok(UploadedAsset { key, url, duration })
    }
}

#[async_trait]
impl MediaStore for MediaStoreAdapter {
    #[tracing::instrument(skip(self), fields(backend = %self.storage.backend_type()))]
    async fn upload(&self, local_path: &Path, kind: AssetKind) -> StorageResult<UploadedAsset> {
        let result = self.upload_inner(local_path, kind).await;

        if let Err(e) = tokio::fs::remove_file(local_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    error = %e,
                    path = %local_path.display(),
                    "Failed to remove temporary upload file"
                );
            }
        }

        result
    }

    #[tracing::instrument(skip(self), fields(backend = %self.storage.backend_type()))]
    async fn delete(&self, url: &str) -> StorageResult<bool> {
        let Some(key) = self.storage.key_for_url(url) else {
            tracing::warn!(url = %url, "URL does not belong to this media store");
            return Ok(false);
        };

        if !self.storage.exists(&key).await? {
            return Ok(false);
        }

        self.storage.delete(&key).await?;
        Ok(true)
    }
}
