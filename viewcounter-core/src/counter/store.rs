/*
    store.rs - Per-video replica counter store

    Holds one grow-only counter per video id. Each store belongs to
    exactly one replica and only ever raises its own entry through
    increments; entries attributed to other replicas change only via
    merge, and only upward.

    Locking is per video: the outer map lock is held just long enough
    to find or insert an entry, so increments and merges on different
    videos never serialize against each other. Snapshots are full
    clones, readers never observe a partially applied merge.
*/

use super::g_counter::{GCounter, ReplicaId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Video identifier, matching the metadata catalog's numeric ids
pub type VideoId = u64;

/// Per-replica view counter store
pub struct CounterStore {
    /// Identity of the replica that owns this store
    replica_id: ReplicaId,

    /// Per-video counters, each behind its own lock
    videos: RwLock<HashMap<VideoId, Arc<RwLock<GCounter>>>>,

    /// Videos incremented since the last push flush
    dirty: Mutex<HashSet<VideoId>>,
}

impl CounterStore {
    /// Create a new empty store owned by the given replica
    pub fn new(replica_id: impl Into<ReplicaId>) -> Self {
        CounterStore {
            replica_id: replica_id.into(),
            videos: RwLock::new(HashMap::new()),
            dirty: Mutex::new(HashSet::new()),
        }
    }

    /// Identity of the owning replica
    pub fn replica_id(&self) -> &str {
        &self.replica_id
    }

    /// Find or create the counter entry for a video
    async fn entry(&self, video_id: VideoId) -> Arc<RwLock<GCounter>> {
        {
            let videos = self.videos.read().await;
            if let Some(counter) = videos.get(&video_id) {
                return counter.clone();
            }
        }

        let mut videos = self.videos.write().await;
        videos
            .entry(video_id)
            .or_insert_with(|| Arc::new(RwLock::new(GCounter::new())))
            .clone()
    }

    /// Apply one local increment for a video
    ///
    /// Bumps this replica's own entry by 1, marks the video dirty for
    /// the next push flush, and returns the new own count. Never
    /// blocks on network I/O.
    pub async fn increment(&self, video_id: VideoId) -> u64 {
        let entry = self.entry(video_id).await;
        let new_count = {
            let mut counter = entry.write().await;
            counter.increment(&self.replica_id)
        };

        self.dirty.lock().await.insert(video_id);
        new_count
    }

    /// Immutable copy of the full per-replica map for a video
    ///
    /// Returns an empty counter for a video this store does not track
    /// yet; a pulling peer merging an empty state is a no-op.
    pub async fn snapshot(&self, video_id: VideoId) -> GCounter {
        let videos = self.videos.read().await;
        match videos.get(&video_id) {
            Some(entry) => entry.read().await.clone(),
            None => GCounter::new(),
        }
    }

    /// Sum across all replica entries currently known for a video
    pub async fn total(&self, video_id: VideoId) -> u64 {
        let videos = self.videos.read().await;
        match videos.get(&video_id) {
            Some(entry) => entry.read().await.value(),
            None => 0,
        }
    }

    /// This replica's own entry for a video, without merging
    pub async fn local_count(&self, video_id: VideoId) -> u64 {
        let videos = self.videos.read().await;
        match videos.get(&video_id) {
            Some(entry) => entry.read().await.count_for(&self.replica_id),
            None => 0,
        }
    }

    /// Merge a peer snapshot into local state
    ///
    /// Creates the entry if this is the first time the video is seen
    /// (a merge can introduce a video just like an increment can).
    pub async fn merge_remote(&self, video_id: VideoId, remote: &GCounter) {
        let entry = self.entry(video_id).await;
        let mut counter = entry.write().await;
        counter.merge(remote);
    }

    /// Video ids with local state, for the anti-entropy sweep
    pub async fn tracked_videos(&self) -> Vec<VideoId> {
        let videos = self.videos.read().await;
        videos.keys().copied().collect()
    }

    /// Take and clear the set of videos touched since the last flush
    pub async fn drain_dirty(&self) -> Vec<VideoId> {
        let mut dirty = self.dirty.lock().await;
        dirty.drain().collect()
    }
}
