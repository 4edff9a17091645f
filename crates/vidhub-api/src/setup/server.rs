//! Server startup and graceful shutdown

use crate::services::AssetCleanupWorker;
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;

/// Serve until SIGINT/SIGTERM, then drain the asset cleanup queue and close the pool.
pub async fn start_server(
    state: Arc<AppState>,
    app: Router,
    cleanup_worker: AssetCleanupWorker,
) -> Result<()> {
    let config = &state.config;
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        max_video_mb = config.max_video_size_bytes() / 1024 / 1024,
        max_image_mb = config.max_image_size_bytes() / 1024 / 1024,
        video_extensions = %config.video_allowed_extensions().join(","),
        image_extensions = %config.image_allowed_extensions().join(","),
        environment = %config.environment(),
        "Server ready and accepting connections"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cleanup_worker.shutdown().await;
    if let Some(database) = &state.database {
        database.close().await;
    }

    served.context("Server error")?;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM. A handler that cannot be installed is
/// logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
