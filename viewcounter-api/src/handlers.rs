//! HTTP handlers for the client-facing and replica-to-replica routes

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::*;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use viewcounter_core::health::HealthCheck;
use viewcounter_core::sync::transport::SyncEnvelope;

// ============================================================================
// Client-facing handlers
// ============================================================================

/// POST /api/videos/:video_id/view-crdt - Record one view
///
/// Answers as soon as the local increment commits; peer delivery runs
/// in the background.
pub async fn record_view(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<u64>,
) -> ApiResult<Json<RecordViewResponse>> {
    state.service.record_view(video_id).await?;

    Ok(Json(RecordViewResponse {
        video_id,
        replica_id: state.service.replica_id().to_string(),
    }))
}

/// GET /api/videos/:video_id/views-crdt - Merged total view count
pub async fn get_views(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<u64>,
) -> ApiResult<Json<TotalViewsResponse>> {
    let total_views = state.service.merged_total(video_id).await?;

    Ok(Json(TotalViewsResponse { total_views }))
}

/// GET /api/videos - Catalog listing, doubles as a liveness probe
pub async fn list_videos(State(state): State<Arc<AppState>>) -> Json<VideoListResponse> {
    Json(VideoListResponse { videos: state.catalog.videos() })
}

/// GET /health - Process liveness
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let check: HealthCheck = state.health.check_health();
    let status = StatusCode::from_u16(check.status.to_http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(check)).into_response()
}

// ============================================================================
// Replica-to-replica handlers
// ============================================================================

/// POST /api/crdt/sync - Accept a pushed snapshot from a peer
pub async fn receive_sync(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<SyncEnvelope>,
) -> ApiResult<Json<SyncAckResponse>> {
    let video_id = envelope.video_id;
    state.service.receive_sync(envelope).await?;

    Ok(Json(SyncAckResponse {
        video_id,
        replica_id: state.service.replica_id().to_string(),
    }))
}

/// GET /api/crdt/state/:video_id - Serve the local snapshot to a
/// pulling peer
///
/// An untracked video answers with an empty counter map, which merges
/// as a no-op on the caller's side.
pub async fn sync_state(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<u64>,
) -> Json<SyncEnvelope> {
    Json(state.service.local_state(video_id).await)
}

/// POST /api/crdt/sync/pull/:video_id - Manually trigger a pull-merge
pub async fn manual_pull(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<u64>,
) -> ApiResult<Json<PullSyncResponse>> {
    let merged_peers = state.service.pull_from_peers(video_id).await;
    let total_views = state.service.local_state(video_id).await.into_counter().value();

    Ok(Json(PullSyncResponse { video_id, merged_peers, total_views }))
}

/// GET /api/crdt/health - Replica-scoped liveness
pub async fn crdt_health(State(state): State<Arc<AppState>>) -> Json<CrdtHealthResponse> {
    Json(CrdtHealthResponse {
        status: "UP".to_string(),
        replica_id: state.service.replica_id().to_string(),
    })
}
