//! Ordered annotation saves.
//!
//! Every mutation enqueues a snapshot of the full current record; a single
//! worker task drains the queue, so saves for a video always reach the
//! store in mutation order and an out-of-order completion can never
//! resurrect older state. A failed save is logged and skipped — the
//! in-memory record stays authoritative and the next mutation re-sends
//! the complete state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use framemark_models::{AnnotationRecord, VideoId};
use framemark_store::AnnotationStore;

/// Handle for enqueuing full-record saves.
#[derive(Debug, Clone)]
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<(VideoId, AnnotationRecord)>,
}

impl SaveQueue {
    /// Spawn the save worker and return the queue handle.
    pub fn start(store: Arc<dyn AnnotationStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<(VideoId, AnnotationRecord)>();

        tokio::spawn(async move {
            while let Some((video_id, record)) = rx.recv().await {
                if let Err(e) = store.save(&video_id, &record).await {
                    warn!(
                        video_id = %video_id,
                        error = %e,
                        "Annotation save failed; keeping in-memory state"
                    );
                }
            }
        });

        Self { tx }
    }

    /// Queue a full-record upsert. Never blocks the caller.
    pub fn enqueue(&self, video_id: VideoId, record: AnnotationRecord) {
        if self.tx.send((video_id, record)).is_err() {
            warn!("Save worker stopped; dropping annotation save");
        }
    }
}
