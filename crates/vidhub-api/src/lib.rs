//! Vidhub API Library
//!
//! This crate provides the HTTP API handlers, middleware, video workflows, background
//! asset cleanup, and application setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod services;
pub mod setup;
mod telemetry;
pub mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod response;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use response::ApiResponse;
pub use setup::routes::setup_routes;
pub use state::AppState;
