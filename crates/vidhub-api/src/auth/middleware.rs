use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use vidhub_core::AppError;

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

/// Resolve `Authorization: Bearer <access token>` into an [`AuthUser`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return unauthorized("Missing authorization header"),
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return unauthorized("Invalid authorization header format");
    };

    let claims = match state.tokens.verify_access(token.trim()) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    let user = match state.users.find_by_id(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
            return unauthorized("Invalid access token");
        }
        Err(e) => return HttpAppError(e).into_response(),
    };

    request.extensions_mut().insert(AuthUser { user });

    next.run(request).await
}
