use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.public_dir);

    Router::new()
        // Realtime socket (or the landing page for plain GETs)
        .route("/", get(handlers::root))
        // Health check
        .route("/health", get(handlers::health_check))
        // Static assets
        .fallback_service(assets)
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
