//! Background deletion of superseded or orphaned media assets.
//!
//! Workflows schedule a URL once the database no longer references it. The worker
//! deletes it through the media store, retrying failures with linear backoff. When
//! retries run out the asset is reported as leaked; nothing is surfaced to the client.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use vidhub_core::Config;
use vidhub_storage::MediaStore;

#[derive(Debug, Clone)]
pub struct AssetCleanupJob {
    pub url: String,
    /// Short label for logs, e.g. "replaced_thumbnail"
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct AssetCleanupSettings {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub call_timeout: Duration,
}

impl From<&Config> for AssetCleanupSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_retries: config.asset_cleanup_max_retries(),
            retry_delay: Duration::from_millis(config.asset_cleanup_retry_delay_ms()),
            call_timeout: Duration::from_secs(config.media_store_timeout_secs()),
        }
    }
}

/// Cheap, cloneable handle used by workflows to schedule deletions.
#[derive(Clone)]
pub struct AssetCleanupHandle {
    tx: mpsc::UnboundedSender<AssetCleanupJob>,
}

impl AssetCleanupHandle {
    /// Queue `url` for deletion. Never blocks and never fails the caller.
    pub fn schedule(&self, url: impl Into<String>, reason: &'static str) {
        let job = AssetCleanupJob {
            url: url.into(),
            reason,
        };
        tracing::debug!(url = %job.url, reason, "Scheduling asset deletion");
        if let Err(e) = self.tx.send(job) {
            tracing::error!(
                url = %e.0.url,
                reason = e.0.reason,
                "Asset cleanup worker is not running; asset leaked"
            );
        }
    }
}

/// Owns the worker task. Dropping it without calling [`shutdown`](Self::shutdown)
/// leaves the worker running until every handle is dropped.
pub struct AssetCleanupWorker {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl AssetCleanupWorker {
    /// Stop accepting new jobs, finish everything already queued, then return.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.join).await {
            tracing::error!(error = %e, "Asset cleanup worker panicked");
        }
    }
}

pub struct AssetCleanupService;

impl AssetCleanupService {
    /// Spawn the worker on the current runtime.
    pub fn start(
        media: Arc<dyn MediaStore>,
        settings: AssetCleanupSettings,
    ) -> (AssetCleanupHandle, AssetCleanupWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let join = tokio::spawn(run_worker(media, settings, rx, shutdown_rx));

        tracing::info!(
            max_retries = settings.max_retries,
            retry_delay_ms = settings.retry_delay.as_millis() as u64,
            "Asset cleanup worker started"
        );

        (
            AssetCleanupHandle { tx },
            AssetCleanupWorker {
                shutdown_tx: Some(shutdown_tx),
                join,
            },
        )
    }
}

async fn run_worker(
    media: Arc<dyn MediaStore>,
    settings: AssetCleanupSettings,
    mut rx: mpsc::UnboundedReceiver<AssetCleanupJob>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut in_flight = JoinSet::new();
    // A dropped worker handle is not a shutdown request
    let mut shutdown_armed = true;

    loop {
        tokio::select! {
            job = rx.recv() => match job {
                Some(job) => {
                    in_flight.spawn(delete_with_retry(media.clone(), settings, job));
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            signal = &mut shutdown_rx, if shutdown_armed => {
                if signal.is_ok() {
                    rx.close();
                    break;
                }
                shutdown_armed = false;
            }
        }
    }

    // Drain whatever was queued before the channel closed
    while let Some(job) = rx.recv().await {
        in_flight.spawn(delete_with_retry(media.clone(), settings, job));
    }
    let pending = in_flight.len();
    if pending > 0 {
        tracing::info!(pending, "Waiting for pending asset deletions");
    }
    while in_flight.join_next().await.is_some() {}

    tracing::info!("Asset cleanup worker stopped");
}

#[tracing::instrument(skip(media, settings), fields(url = %job.url, reason = job.reason))]
async fn delete_with_retry(
    media: Arc<dyn MediaStore>,
    settings: AssetCleanupSettings,
    job: AssetCleanupJob,
) {
    let attempts = settings.max_retries.saturating_add(1);

    for attempt in 1..=attempts {
        let outcome = tokio::time::timeout(settings.call_timeout, media.delete(&job.url)).await;

        let error = match outcome {
            Ok(Ok(true)) => {
                tracing::info!(attempt, "Deleted asset");
                return;
            }
            Ok(Ok(false)) => {
                tracing::warn!("Asset not found in media store; nothing to delete");
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => "timed out".to_string(),
        };

        if attempt == attempts {
            tracing::error!(
                attempt,
                error = %error,
                "Giving up on asset deletion; asset leaked"
            );
            return;
        }

        let delay = settings.retry_delay.saturating_mul(attempt);
        tracing::warn!(
            attempt,
            error = %error,
            retry_in_ms = delay.as_millis() as u64,
            "Asset deletion failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
