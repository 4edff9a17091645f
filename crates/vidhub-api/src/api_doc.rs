//! OpenAPI documentation, served at `/api/openapi.json` and rendered under `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::response::Empty;
use vidhub_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidhub API",
        version = "0.1.0",
        description = "Video hosting API: accounts, uploads, and a searchable, paginated video listing. All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Videos
        handlers::videos::list_videos,
        handlers::videos::publish_video,
        handlers::videos::get_video,
        handlers::videos::update_video,
        handlers::videos::delete_video,
        handlers::videos::toggle_publish_status,
        // Users
        handlers::users::register,
        handlers::users::login,
        handlers::users::logout,
        handlers::users::refresh_token,
        handlers::users::change_password,
        handlers::users::current_user,
        handlers::users::update_account,
        handlers::users::update_avatar,
        handlers::users::update_cover_image,
        handlers::users::watch_history,
        // Health
        handlers::health::healthcheck,
    ),
    components(
        schemas(
            models::Video,
            models::VideoWithOwner,
            models::OwnerDetails,
            models::UserResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::RefreshTokenRequest,
            models::TokenPair,
            models::ChangePasswordRequest,
            models::UpdateAccountRequest,
            Empty,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video listing, upload, and owner-only management"),
        (name = "users", description = "Registration, sessions, and profile management"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_listing_path_with_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/videos"));
        assert!(doc.paths.paths.contains_key("/api/v1/videos/{videoId}"));
        assert!(doc.paths.paths.contains_key("/api/v1/users/login"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
