//! API routes and handlers

mod health;
mod process;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState, cors_enabled: bool) -> Router {
    // Face videos are far larger than the extractor's 2 MB default.
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    let router = Router::new()
        // Health check
        .route("/", get(health::health_check))
        // Lip-sync job; both spellings reach the same handler
        .route("/process/", post(process::process).layer(upload_limit))
        .route("/process", post(process::process).layer(upload_limit))
        .layer(TraceLayer::new_for_http());

    let router = if cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
