/*
    catalog.rs - Video metadata collaborator boundary

    The real metadata store lives outside this service; the counter
    engine only needs its verdict on whether a video id exists. The
    trait is the seam, the static implementation is seeded from
    configuration and stands in for the external store.
*/

use crate::counter::VideoId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Listing entry returned by the catalog probe endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: VideoId,
    pub title: String,
}

/// Verdict source for video existence
pub trait VideoCatalog: Send + Sync {
    /// Whether the given video id is known to the metadata store
    fn contains(&self, video_id: VideoId) -> bool;

    /// All known videos, for the listing probe
    fn videos(&self) -> Vec<VideoSummary>;
}

/// Catalog seeded from configuration at startup
pub struct StaticCatalog {
    videos: BTreeMap<VideoId, VideoSummary>,
}

impl StaticCatalog {
    /// Build a catalog from explicit entries
    pub fn new(entries: impl IntoIterator<Item = VideoSummary>) -> Self {
        let videos = entries.into_iter().map(|v| (v.id, v)).collect();
        StaticCatalog { videos }
    }

    /// Build a catalog from bare ids, with placeholder titles
    pub fn from_ids(ids: impl IntoIterator<Item = VideoId>) -> Self {
        Self::new(ids.into_iter().map(|id| VideoSummary {
            id,
            title: format!("video-{}", id),
        }))
    }
}

impl VideoCatalog for StaticCatalog {
    fn contains(&self, video_id: VideoId) -> bool {
        self.videos.contains_key(&video_id)
    }

    fn videos(&self) -> Vec<VideoSummary> {
        self.videos.values().cloned().collect()
    }
}
