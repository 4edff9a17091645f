//! Multipart upload handling: text fields are collected, file fields are streamed to
//! temporary files under `UPLOAD_TEMP_DIR` with their extension and size checked on the way.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use vidhub_core::{AppError, Config};
use vidhub_storage::AssetKind;

/// A received file on local disk. The file is removed when this value is dropped.
#[derive(Debug)]
pub struct TempUpload {
    path: TempPath,
    original_name: String,
    size: usize,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Size and extension limits for uploaded files.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub temp_dir: PathBuf,
    pub max_video_size: usize,
    pub max_image_size: usize,
    pub video_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
}

impl From<&Config> for UploadLimits {
    fn from(config: &Config) -> Self {
        Self {
            temp_dir: config.upload_temp_dir().clone(),
            max_video_size: config.max_video_size_bytes(),
            max_image_size: config.max_image_size_bytes(),
            video_extensions: config.video_allowed_extensions().to_vec(),
            image_extensions: config.image_allowed_extensions().to_vec(),
        }
    }
}

impl UploadLimits {
    fn for_kind(&self, kind: AssetKind) -> (usize, &[String]) {
        match kind {
            AssetKind::Video => (self.max_video_size, &self.video_extensions),
            AssetKind::Image => (self.max_image_size, &self.image_extensions),
        }
    }
}

/// Parsed multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, TempUpload>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<TempUpload> {
        self.files.remove(name)
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body is too large".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e.body_text()))
    }
}

/// Read a multipart form. `file_fields` names the fields that carry files and the
/// asset kind whose limits apply to each; any other file field is skipped.
pub async fn read_upload_form(
    mut multipart: Multipart,
    limits: &UploadLimits,
    file_fields: &[(&str, AssetKind)],
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if let Some((_, kind)) = file_fields.iter().find(|(name, _)| *name == field_name) {
            if form.files.contains_key(&field_name) {
                return Err(AppError::InvalidInput(format!(
                    "Multiple files sent for {}",
                    field_name
                )));
            }
            let upload = stream_to_temp_file(field, &field_name, *kind, limits).await?;
            form.files.insert(field_name, upload);
        } else if field.file_name().is_some() {
            tracing::debug!(field = %field_name, "Skipping unexpected file field");
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}

async fn stream_to_temp_file(
    mut field: Field<'_>,
    field_name: &str,
    kind: AssetKind,
    limits: &UploadLimits,
) -> Result<TempUpload, AppError> {
    let (max_size, allowed_extensions) = limits.for_kind(kind);

    let original_name = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::InvalidInput(format!("{} must be a file", field_name)))?;
    let extension = validate_file_extension(&original_name, allowed_extensions)?;

    tokio::fs::create_dir_all(&limits.temp_dir).await?;
    let (file, path) = tempfile::Builder::new()
        .prefix("vidhub-upload-")
        .suffix(&format!(".{}", extension))
        .tempfile_in(&limits.temp_dir)?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut size = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size = size.saturating_add(chunk.len());
        validate_file_size(size, max_size)?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    if size == 0 {
        return Err(AppError::InvalidInput(format!("{} is empty", field_name)));
    }

    tracing::debug!(
        field = %field_name,
        size,
        path = %path.display(),
        "Received upload"
    );

    Ok(TempUpload {
        path,
        original_name,
        size,
    })
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Validate file extension; returns it lowercased.
pub fn validate_file_extension(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, AppError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    Ok(extension)
}
