use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recorder lifecycle
        .route("/recorder/prepare", post(handlers::prepare_recording))
        .route("/recorder/start", post(handlers::start_recording))
        .route("/recorder/pause", post(handlers::pause_recording))
        .route("/recorder/resume", post(handlers::resume_recording))
        .route("/recorder/stop", post(handlers::stop_recording))
        .route("/recorder/status", get(handlers::recorder_status))
        // Player lifecycle
        .route("/player/play", post(handlers::play))
        .route("/player/pause", post(handlers::pause_playback))
        .route("/player/unpause", post(handlers::unpause_playback))
        .route("/player/stop", post(handlers::stop_playback))
        .route("/player/seek", post(handlers::seek))
        .route("/player/duration", get(handlers::duration_from_path))
        .route("/player/outputs", get(handlers::get_outputs))
        .route("/player/status", get(handlers::player_status))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
