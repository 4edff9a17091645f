//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::middleware::auth_middleware;
use crate::constants::API_PREFIX;
use crate::handlers::{health, users, videos};
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use vidhub_core::Config;

/// Build the full application router over the given state.
pub fn setup_routes(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state.config)?;

    // route_layer: unmatched paths fall through to 404 rather than 401
    let protected_routes = protected_routes().route_layer(
        axum::middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    let app = public_routes()
        .merge(protected_routes)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(RequestBodyLimitLayer::new(
            state.config.max_request_body_bytes(),
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(&format!("{}/healthcheck", API_PREFIX), get(health::healthcheck))
        .route(&format!("{}/users/register", API_PREFIX), post(users::register))
        .route(&format!("{}/users/login", API_PREFIX), post(users::login))
        .route(
            &format!("{}/users/refresh-token", API_PREFIX),
            post(users::refresh_token),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Users
        .route(&format!("{}/users/logout", API_PREFIX), post(users::logout))
        .route(
            &format!("{}/users/change-password", API_PREFIX),
            post(users::change_password),
        )
        .route(
            &format!("{}/users/current-user", API_PREFIX),
            get(users::current_user),
        )
        .route(
            &format!("{}/users/update-account", API_PREFIX),
            patch(users::update_account),
        )
        .route(
            &format!("{}/users/avatar", API_PREFIX),
            patch(users::update_avatar),
        )
        .route(
            &format!("{}/users/cover-image", API_PREFIX),
            patch(users::update_cover_image),
        )
        .route(
            &format!("{}/users/history", API_PREFIX),
            get(users::watch_history),
        )
        // Videos
        .route(
            &format!("{}/videos", API_PREFIX),
            get(videos::list_videos).post(videos::publish_video),
        )
        .route(
            &format!("{}/videos/{{videoId}}", API_PREFIX),
            get(videos::get_video)
                .patch(videos::update_video)
                .delete(videos::delete_video),
        )
        .route(
            &format!("{}/videos/{{videoId}}/toggle-publish", API_PREFIX),
            patch(videos::toggle_publish_status),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("CORS_ORIGINS contains an invalid origin")?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
