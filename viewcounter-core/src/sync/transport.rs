/*
    transport.rs - Point-to-point replica state exchange

    Ferries counter snapshots between replicas and reports transport
    failure without ever touching store state. Push is fire-and-forget
    (a failed push is counted and forgotten; anti-entropy repairs the
    divergence later), pull is synchronous and bounded by a timeout.

    The wire format carries the full per-replica map. Summing before
    transmission would destroy the merge algebra and reintroduce
    double-counting across merges.
*/

use crate::counter::{CounterError, CounterResult, GCounter, ReplicaId, VideoId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// One reachable peer replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Stable identity of the peer replica
    pub replica_id: ReplicaId,

    /// Base URL of the peer's HTTP surface, e.g. "http://backend2:8080"
    pub base_url: String,
}

/// Serialized counter state exchanged between replicas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEnvelope {
    pub video_id: VideoId,
    pub source_replica_id: ReplicaId,

    /// Full per-replica map, never a pre-summed total
    pub counts: HashMap<ReplicaId, u64>,
}

impl SyncEnvelope {
    /// Wrap a local snapshot for transmission
    pub fn from_snapshot(video_id: VideoId, source_replica_id: &str, snapshot: &GCounter) -> Self {
        SyncEnvelope {
            video_id,
            source_replica_id: source_replica_id.to_string(),
            counts: snapshot.counts(),
        }
    }

    /// Validate a received payload before it may reach the merge
    ///
    /// A malformed envelope is discarded as a transport-level failure;
    /// it must never corrupt local state.
    pub fn validate(&self) -> CounterResult<()> {
        if self.source_replica_id.is_empty() {
            return Err(CounterError::InvalidPayload(
                "empty source replica id".to_string(),
            ));
        }
        if self.counts.keys().any(|id| id.is_empty()) {
            return Err(CounterError::InvalidPayload(
                "empty replica id in counts map".to_string(),
            ));
        }
        Ok(())
    }

    /// The carried state as a counter, ready to merge
    pub fn into_counter(self) -> GCounter {
        GCounter::from_counts(self.counts)
    }
}

/// Transport-level failures
///
/// All of these mean "no new information", never "reset local state".
#[derive(Debug, Error)]
pub enum TransportError {
    /// Peer could not be reached
    #[error("Peer unreachable: {0}")]
    Unreachable(String),

    /// Call exceeded its deadline
    #[error("Request timed out")]
    Timeout,

    /// Peer answered with a non-success status
    #[error("Peer returned status {0}")]
    BadStatus(u16),

    /// Response body was not a well-formed counter map
    #[error("Malformed peer payload: {0}")]
    Malformed(String),

    /// Client could not be constructed
    #[error("Transport setup failed: {0}")]
    Setup(String),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Moves counter snapshots between replicas
///
/// Implementations only ferry state; merging is the caller's job.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Best-effort delivery of a snapshot to one peer
    async fn push(&self, peer: &Peer, envelope: &SyncEnvelope) -> TransportResult<()>;

    /// Request a peer's current snapshot for one video
    async fn pull(&self, peer: &Peer, video_id: VideoId) -> TransportResult<SyncEnvelope>;
}

/// HTTP transport speaking the replica-to-replica sync endpoints
pub struct HttpSyncTransport {
    push_client: reqwest::Client,
    pull_client: reqwest::Client,
}

impl HttpSyncTransport {
    /// Build a transport with separate push and pull deadlines
    pub fn new(push_timeout: Duration, pull_timeout: Duration) -> TransportResult<Self> {
        let push_client = reqwest::Client::builder()
            .timeout(push_timeout)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        let pull_client = reqwest::Client::builder()
            .timeout(pull_timeout)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(HttpSyncTransport { push_client, pull_client })
    }

    fn map_request_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Unreachable(err.to_string())
        }
    }
}

#[async_trait]
impl SyncTransport for HttpSyncTransport {
    async fn push(&self, peer: &Peer, envelope: &SyncEnvelope) -> TransportResult<()> {
        let url = format!("{}/api/crdt/sync", peer.base_url);

        let response = self
            .push_client
            .post(&url)
            .json(envelope)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(TransportError::BadStatus(response.status().as_u16()));
        }
        Ok(())
    }

    async fn pull(&self, peer: &Peer, video_id: VideoId) -> TransportResult<SyncEnvelope> {
        let url = format!("{}/api/crdt/state/{}", peer.base_url, video_id);

        let response = self
            .pull_client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        if !response.status().is_success() {
            return Err(TransportError::BadStatus(response.status().as_u16()));
        }

        let envelope: SyncEnvelope = response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        envelope
            .validate()
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        Ok(envelope)
    }
}
