//! Request/Response types for the HTTP surface
//!
//! Field names are camelCase on the wire; the replica-to-replica
//! envelope itself lives in the core crate.

use serde::{Deserialize, Serialize};
use viewcounter_core::catalog::VideoSummary;

// ============================================================================
// Client-facing types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewResponse {
    pub video_id: u64,

    /// Which replica committed the increment
    pub replica_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalViewsResponse {
    pub total_views: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Replica-to-replica types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAckResponse {
    pub video_id: u64,
    pub replica_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullSyncResponse {
    pub video_id: u64,

    /// How many peers contributed state to this pull
    pub merged_peers: usize,

    pub total_views: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdtHealthResponse {
    pub status: String,
    pub replica_id: String,
}
