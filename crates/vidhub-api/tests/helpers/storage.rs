//! Recording media store for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;
use vidhub_storage::{AssetKind, MediaStore, StorageError, StorageResult, UploadedAsset};

/// Duration reported for every uploaded video.
pub const VIDEO_DURATION: f64 = 42.5;

/// Records every upload and delete; uploads can be switched to fail.
#[derive(Default)]
pub struct MockMediaStore {
    uploads: Mutex<Vec<(AssetKind, String)>>,
    deletes: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// URLs handed out so far, in order.
    pub fn uploaded_urls(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(_, url)| url.clone())
            .collect()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn deleted_urls(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(&self, local_path: &Path, kind: AssetKind) -> StorageResult<UploadedAsset> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "media service unavailable".to_string(),
            ));
        }
        if !local_path.exists() {
            return Err(StorageError::NotFound(local_path.display().to_string()));
        }

        let extension = local_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let prefix = match kind {
            AssetKind::Video => "videos",
            AssetKind::Image => "images",
        };
        let key = format!("{}/{}.{}", prefix, Uuid::new_v4(), extension);
        let url = format!("http://media.test/{}", key);

        self.uploads.lock().unwrap().push((kind, url.clone()));

        Ok(UploadedAsset {
            key,
            url,
            duration: match kind {
                AssetKind::Video => Some(VIDEO_DURATION),
                AssetKind::Image => None,
            },
        })
    }

    async fn delete(&self, url: &str) -> StorageResult<bool> {
        self.deletes.lock().unwrap().push(url.to_string());
        Ok(true)
    }
}
