//! Persistence contracts, abstracted from transport.
//!
//! The engine only sees these traits; the filesystem implementation in
//! [`crate::fs`] is the default backend, but a remote one can be swapped
//! in without touching the engine.

use async_trait::async_trait;

use framemark_models::{AnnotationRecord, Video, VideoId};

use crate::error::StoreResult;

/// Video listing and frame sequences.
#[async_trait]
pub trait VideoLibrary: Send + Sync {
    /// List all known videos with their annotation summaries.
    async fn list_videos(&self) -> StoreResult<Vec<Video>>;

    /// Ordered frame filenames for a video.
    async fn frame_sequence(&self, video_id: &VideoId) -> StoreResult<Vec<String>>;
}

/// Durable annotation records, one per video.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Load a video's record; an empty default if none exists yet.
    async fn load(&self, video_id: &VideoId) -> StoreResult<AnnotationRecord>;

    /// Full-record upsert. Implementations stamp `last_modified`.
    async fn save(&self, video_id: &VideoId, record: &AnnotationRecord) -> StoreResult<()>;
}

/// Frame image resources.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Load the raw image bytes of one frame.
    async fn load_frame(&self, video_id: &VideoId, frame_id: &str) -> StoreResult<Vec<u8>>;
}
