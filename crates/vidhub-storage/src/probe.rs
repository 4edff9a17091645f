//! Duration probing for uploaded video files.

use crate::traits::{StorageError, StorageResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;

/// Reports the playback length of a local media file in seconds.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// `Ok(None)` when the file carries no usable duration.
    async fn probe_duration(&self, local_path: &Path) -> StorageResult<Option<f64>>;
}

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    format: Option<FFprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    duration: Option<String>,
}

/// Runs `ffprobe -show_format` and reads `format.duration`.
pub struct FfprobeDurationProbe {
    ffprobe_path: String,
}

impl FfprobeDurationProbe {
    pub fn new(ffprobe_path: String) -> Self {
        Self { ffprobe_path }
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    #[tracing::instrument(skip(self), fields(service = "ffprobe"))]
    async fn probe_duration(&self, local_path: &Path) -> StorageResult<Option<f64>> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-show_format", "-of", "json"])
            .arg(local_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| StorageError::ProbeFailed(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(stderr = %stderr, "ffprobe failed");
            return Err(StorageError::ProbeFailed(format!("ffprobe failed: {}", stderr)));
        }

        parse_ffprobe_duration(&output.stdout)
    }
}

/// Extract `format.duration` from ffprobe JSON output.
pub fn parse_ffprobe_duration(stdout: &[u8]) -> StorageResult<Option<f64>> {
    let parsed: FFprobeOutput = serde_json::from_slice(stdout).map_err(|e| {
        StorageError::ProbeFailed(format!("Failed to parse ffprobe output: {}", e))
    })?;

    Ok(parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0))
}
