use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;
use vidhub_core::models::User;
use vidhub_core::AppError;

/// Caller identity resolved by the auth middleware and stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Unauthorized request".to_string())))
    }
}
