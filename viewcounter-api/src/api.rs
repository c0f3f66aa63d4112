//! API routes definition

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Client-facing routes
        .route("/api/videos", get(handlers::list_videos))
        .route("/api/videos/:video_id/view-crdt", post(handlers::record_view))
        .route("/api/videos/:video_id/views-crdt", get(handlers::get_views))
        .route("/health", get(handlers::health))
        // Replica-to-replica routes
        .route("/api/crdt/sync", post(handlers::receive_sync))
        .route("/api/crdt/state/:video_id", get(handlers::sync_state))
        .route("/api/crdt/sync/pull/:video_id", post(handlers::manual_pull))
        .route("/api/crdt/health", get(handlers::crdt_health))
        // State
        .with_state(state)
}
