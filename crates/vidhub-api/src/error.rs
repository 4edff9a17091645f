//! HTTP error response conversion
//!
//! Every failure leaves the API as the failure envelope:
//! `{statusCode, message, success: false, errors, code, details?}`.
//!
//! **Handler pattern:** return `Result<impl IntoResponse, HttpAppError>` and let `?`
//! convert `AppError` (or anything that converts into it) at the boundary.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use vidhub_core::{AppError, ErrorMetadata, LogLevel};
use vidhub_storage::StorageError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    /// Always `false`
    pub success: bool,
    pub errors: Vec<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status_code: status.as_u16(),
            errors: vec![message.clone()],
            message,
            success: false,
            code: code.into(),
            details: None,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: IntoResponse and AppError both live in other crates).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body deserialization failures into a 400 failure envelope.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that rejects with the failure envelope instead of axum's plain text.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Build the failure envelope for an error. Sensitive errors carry neither a cause
/// in `errors` nor `details`.
pub(crate) fn error_body(app_error: &AppError, is_production: bool) -> ErrorResponse {
    let status = StatusCode::from_u16(app_error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = ErrorResponse::new(status, app_error.client_message(), app_error.error_code());

    if app_error.is_sensitive() {
        body.errors.clear();
    } else if !is_production {
        body.details = Some(app_error.detailed_message());
    }
    body
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        log_error(app_error);

        let body = error_body(app_error, is_production_env());
        let status =
            StatusCode::from_u16(body.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error_to_app(err))
    }
}

/// Map media-store failures onto the error taxonomy. Keys are generated server-side,
/// so a rejected key is an upload failure like any other backend error.
pub fn storage_error_to_app(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
        StorageError::ConfigError(msg) => AppError::Internal(msg),
        other => AppError::Storage(other.to_string()),
    }
}
