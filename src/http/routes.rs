use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_session).delete(handlers::close_session),
        )
        // Recording window
        .route(
            "/sessions/:session_id/recording/start",
            post(handlers::start_recording),
        )
        .route(
            "/sessions/:session_id/recording/stop",
            post(handlers::stop_recording),
        )
        .route(
            "/sessions/:session_id/recording/retry",
            post(handlers::retry_recording),
        )
        .route(
            "/sessions/:session_id/recording/chunk",
            post(handlers::upload_chunk),
        )
        // Capture device
        .route(
            "/sessions/:session_id/device",
            post(handlers::set_device_permission),
        )
        .route("/sessions/:session_id/preview", get(handlers::get_preview))
        // Answers and navigation
        .route("/sessions/:session_id/submit", post(handlers::submit))
        .route("/sessions/:session_id/skip", post(handlers::skip))
        .route("/sessions/:session_id/navigate", post(handlers::navigate))
        .route("/sessions/:session_id/finish", post(handlers::finish))
        // The browser client is served from another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
