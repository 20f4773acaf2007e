//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{post_imports, AppState};

/// Create the main API router.
///
/// Request bodies above `max_body_bytes` are rejected before parsing.
pub fn create_router(app_state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let import_routes = Router::new().route("/imports", post(post_imports));

    Router::new()
        .merge(import_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
