//! Health check handlers.

use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "ready", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "ready".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "alive" })))
}

/// Readiness probe - the database answers within the timeout.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match state.database.clone() {
        Some(db) => run_check(CHECK_TIMEOUT, async move { db.ping().await }, "not_ready").await,
        None => "not_configured".to_string(),
    };

    let ready = database == "ready" || database == "not_configured";
    if !ready {
        tracing::error!(database = %database, "Readiness check failed");
    }

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": database,
        })),
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/healthcheck",
    tag = "health",
    responses((status = 200, description = "Service is up", body = ApiResponse<String>))
)]
pub async fn healthcheck() -> ApiResponse<&'static str> {
    ApiResponse::ok("OK", "Health check passed")
}
