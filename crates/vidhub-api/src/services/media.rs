//! Bounded media store calls used by the workflows.

use crate::error::storage_error_to_app;
use crate::state::AppState;
use crate::utils::upload::TempUpload;
use vidhub_core::AppError;
use vidhub_storage::{AssetKind, UploadedAsset};

/// Upload a received file. The temporary file is consumed whatever the outcome.
pub async fn upload_asset(
    state: &AppState,
    file: TempUpload,
    kind: AssetKind,
) -> Result<UploadedAsset, AppError> {
    let path = file.path().to_path_buf();
    let original_name = file.original_name().to_string();
    let size = file.size();
    let result = tokio::time::timeout(state.media_timeout(), state.media.upload(&path, kind)).await;
    drop(file);

    match result {
        Ok(Ok(asset)) => {
            tracing::debug!(
                key = %asset.key,
                kind = %kind,
                original_name = %original_name,
                size,
                "Asset uploaded"
            );
            Ok(asset)
        }
        Ok(Err(e)) => {
            tracing::error!(
                error = %e,
                kind = %kind,
                original_name = %original_name,
                size,
                "Asset upload failed"
            );
            Err(storage_error_to_app(e))
        }
        Err(_) => {
            tracing::error!(
                kind = %kind,
                original_name = %original_name,
                size,
                timeout_secs = state.media_timeout().as_secs(),
                "Asset upload timed out"
            );
            Err(AppError::Internal(format!("Upload of {} asset timed out", kind)))
        }
    }
}
