/*
    Service orchestration - the two externally visible operations

    Composes store, merge, transport and peer set behind the HTTP
    surface:

    - record_view: local increment, then asynchronous best-effort push
      of the updated snapshot to every peer. The caller gets its answer
      as soon as the local increment commits.
    - merged_total: best-effort synchronous pull-merge from each peer,
      then the local total. A peer that is down contributes nothing to
      that particular read and is not an error.

    All peer-communication failures are absorbed here; they never
    propagate to an HTTP client.
*/

use crate::catalog::VideoCatalog;
use crate::counter::{CounterError, CounterResult, CounterStore, VideoId};
use crate::sync::transport::{Peer, SyncEnvelope, SyncTransport};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Replicated view counter service, one per replica process
pub struct ViewCounterService {
    store: Arc<CounterStore>,
    catalog: Arc<dyn VideoCatalog>,
    transport: Arc<dyn SyncTransport>,
    peers: Vec<Peer>,
    push_enabled: bool,
}

impl ViewCounterService {
    /// Assemble the service from its parts
    pub fn new(
        store: Arc<CounterStore>,
        catalog: Arc<dyn VideoCatalog>,
        transport: Arc<dyn SyncTransport>,
        peers: Vec<Peer>,
        push_enabled: bool,
    ) -> Self {
        ViewCounterService { store, catalog, transport, peers, push_enabled }
    }

    /// Identity of the replica answering requests
    pub fn replica_id(&self) -> &str {
        self.store.replica_id()
    }

    /// Peers this replica exchanges state with
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Apply one view for a video on this replica
    ///
    /// Returns once the local increment commits; push delivery is not
    /// awaited. Returns the replica's new own count for the video.
    pub async fn record_view(self: &Arc<Self>, video_id: VideoId) -> CounterResult<u64> {
        if !self.catalog.contains(video_id) {
            return Err(CounterError::UnknownVideo(video_id));
        }

        let new_count = self.store.increment(video_id).await;
        metrics::counter!("viewcounter_views_recorded_total").increment(1);

        debug!(
            replica_id = %self.replica_id(),
            video_id,
            new_count,
            "view recorded"
        );

        if self.push_enabled && !self.peers.is_empty() {
            let service = self.clone();
            tokio::spawn(async move {
                service.flush_pushes().await;
            });
        }

        Ok(new_count)
    }

    /// Push snapshots of every dirty video to every peer
    ///
    /// Fire-and-forget: a failed push is counted and dropped, never
    /// retried here. Anti-entropy is the correctness backstop.
    pub async fn flush_pushes(&self) {
        for video_id in self.store.drain_dirty().await {
            let snapshot = self.store.snapshot(video_id).await;
            let envelope = SyncEnvelope::from_snapshot(video_id, self.replica_id(), &snapshot);

            let mut delivered = 0usize;
            for peer in &self.peers {
                match self.transport.push(peer, &envelope).await {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        metrics::counter!("viewcounter_sync_push_failures_total").increment(1);
                        warn!(
                            replica_id = %self.replica_id(),
                            peer = %peer.replica_id,
                            video_id,
                            error = %e,
                            "push to peer failed"
                        );
                    }
                }
            }

            info!(
                replica_id = %self.replica_id(),
                video_id,
                delivered,
                peer_count = self.peers.len(),
                "pushed update to peers"
            );
        }
    }

    /// Merged total for a video, after a best-effort pull from peers
    pub async fn merged_total(&self, video_id: VideoId) -> CounterResult<u64> {
        if !self.catalog.contains(video_id) {
            return Err(CounterError::UnknownVideo(video_id));
        }

        self.pull_from_peers(video_id).await;

        let total = self.store.total(video_id).await;
        info!(
            replica_id = %self.replica_id(),
            video_id,
            total,
            "merged total served"
        );
        Ok(total)
    }

    /// Pull each peer's snapshot for one video and merge the successes
    ///
    /// Returns how many peers answered. A timed-out or unreachable
    /// peer is treated as "no new information" and skipped.
    pub async fn pull_from_peers(&self, video_id: VideoId) -> usize {
        let mut merged = 0usize;
        for peer in &self.peers {
            match self.transport.pull(peer, video_id).await {
                Ok(envelope) => {
                    if let Err(e) = envelope.validate() {
                        metrics::counter!("viewcounter_sync_pull_failures_total").increment(1);
                        warn!(
                            replica_id = %self.replica_id(),
                            peer = %peer.replica_id,
                            video_id,
                            error = %e,
                            "discarding invalid pull payload"
                        );
                        continue;
                    }
                    self.store.merge_remote(video_id, &envelope.into_counter()).await;
                    merged += 1;
                }
                Err(e) => {
                    metrics::counter!("viewcounter_sync_pull_failures_total").increment(1);
                    warn!(
                        replica_id = %self.replica_id(),
                        peer = %peer.replica_id,
                        video_id,
                        error = %e,
                        "pull from peer failed"
                    );
                }
            }
        }
        merged
    }

    /// Accept a snapshot pushed by another replica and merge it
    pub async fn receive_sync(&self, envelope: SyncEnvelope) -> CounterResult<()> {
        envelope.validate()?;

        info!(
            replica_id = %self.replica_id(),
            source = %envelope.source_replica_id,
            video_id = envelope.video_id,
            "received sync from peer"
        );

        let video_id = envelope.video_id;
        self.store.merge_remote(video_id, &envelope.into_counter()).await;
        Ok(())
    }

    /// Current local snapshot for one video, served to pulling peers
    pub async fn local_state(&self, video_id: VideoId) -> SyncEnvelope {
        let snapshot = self.store.snapshot(video_id).await;
        SyncEnvelope::from_snapshot(video_id, self.replica_id(), &snapshot)
    }

    /// One anti-entropy pass: pull-merge every tracked video from
    /// every peer
    ///
    /// Partial failures skip neither the remaining peers nor the
    /// remaining videos.
    pub async fn anti_entropy_sweep(&self) -> usize {
        let videos = self.store.tracked_videos().await;
        let mut synced = 0usize;

        for video_id in &videos {
            synced += self.pull_from_peers(*video_id).await;
        }

        debug!(
            replica_id = %self.replica_id(),
            video_count = videos.len(),
            merges = synced,
            "anti-entropy sweep finished"
        );
        synced
    }
}
