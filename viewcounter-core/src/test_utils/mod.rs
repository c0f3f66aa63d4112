//! Test utilities for exercising replica topologies in-process
//!
//! Provides an in-memory transport that wires several
//! `ViewCounterService` instances together without any networking,
//! plus a failure-injecting transport for outage scenarios.

use crate::catalog::VideoCatalog;
use crate::counter::{CounterStore, VideoId};
use crate::service::ViewCounterService;
use crate::sync::transport::{Peer, SyncEnvelope, SyncTransport, TransportError, TransportResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared registry wiring loopback replicas together
#[derive(Default)]
struct HubInner {
    services: RwLock<HashMap<String, Arc<ViewCounterService>>>,
    down: RwLock<HashSet<String>>,
}

/// In-process replica topology for tests
#[derive(Clone, Default)]
pub struct LoopbackHub {
    inner: Arc<HubInner>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a service for one replica
    ///
    /// `peer_ids` name the other replicas this one exchanges state
    /// with; they do not need to exist yet (calls to an unregistered
    /// peer fail as unreachable).
    pub async fn service(
        &self,
        replica_id: &str,
        peer_ids: &[&str],
        catalog: Arc<dyn VideoCatalog>,
    ) -> Arc<ViewCounterService> {
        let store = Arc::new(CounterStore::new(replica_id));
        let transport = Arc::new(LoopbackTransport { inner: self.inner.clone() });
        let peers = peer_ids
            .iter()
            .map(|id| Peer {
                replica_id: id.to_string(),
                base_url: format!("loopback://{}", id),
            })
            .collect();

        let service = Arc::new(ViewCounterService::new(store, catalog, transport, peers, true));

        self.inner
            .services
            .write()
            .await
            .insert(replica_id.to_string(), service.clone());

        service
    }

    /// Mark a replica unreachable for both push and pull
    pub async fn set_down(&self, replica_id: &str, down: bool) {
        let mut set = self.inner.down.write().await;
        if down {
            set.insert(replica_id.to_string());
        } else {
            set.remove(replica_id);
        }
    }
}

/// Transport that delivers directly to in-process peer services
struct LoopbackTransport {
    inner: Arc<HubInner>,
}

impl LoopbackTransport {
    async fn target(&self, peer: &Peer) -> TransportResult<Arc<ViewCounterService>> {
        if self.inner.down.read().await.contains(&peer.replica_id) {
            return Err(TransportError::Unreachable(peer.replica_id.clone()));
        }
        self.inner
            .services
            .read()
            .await
            .get(&peer.replica_id)
            .cloned()
            .ok_or_else(|| TransportError::Unreachable(peer.replica_id.clone()))
    }
}

#[async_trait]
impl SyncTransport for LoopbackTransport {
    async fn push(&self, peer: &Peer, envelope: &SyncEnvelope) -> TransportResult<()> {
        let target = self.target(peer).await?;
        target
            .receive_sync(envelope.clone())
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }

    async fn pull(&self, peer: &Peer, video_id: VideoId) -> TransportResult<SyncEnvelope> {
        let target = self.target(peer).await?;
        Ok(target.local_state(video_id).await)
    }
}

/// Transport where every call fails, for outage tests
pub struct FlakyTransport {
    down: bool,
}

impl FlakyTransport {
    pub fn always_down() -> Self {
        FlakyTransport { down: true }
    }
}

#[async_trait]
impl SyncTransport for FlakyTransport {
    async fn push(&self, peer: &Peer, _envelope: &SyncEnvelope) -> TransportResult<()> {
        if self.down {
            return Err(TransportError::Unreachable(peer.replica_id.clone()));
        }
        Ok(())
    }

    async fn pull(&self, peer: &Peer, _video_id: VideoId) -> TransportResult<SyncEnvelope> {
        Err(TransportError::Unreachable(peer.replica_id.clone()))
    }
}
