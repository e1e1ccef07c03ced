//! Engine events for rendering consumers.

use tokio::sync::broadcast;

use framemark_models::AnnotationRecord;

/// Event published after every engine state change.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The current frame index moved (playback tick or manual navigation).
    FrameChanged { index: usize, frame_id: String },
    /// The annotation record mutated; carries the full current record so
    /// markers and list order can be redrawn without another fetch.
    AnnotationChanged { record: AnnotationRecord },
}

/// Broadcast channel for engine events.
///
/// Consumers (rendering surface, sidebar) subscribe; the engine publishes.
/// A send with no subscribers is fine, the event is simply dropped.
#[derive(Debug, Clone)]
pub struct EventChannel {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    pub fn frame_changed(&self, index: usize, frame_id: impl Into<String>) {
        let _ = self.tx.send(EngineEvent::FrameChanged {
            index,
            frame_id: frame_id.into(),
        });
    }

    pub fn annotation_changed(&self, record: &AnnotationRecord) {
        let _ = self.tx.send(EngineEvent::AnnotationChanged {
            record: record.clone(),
        });
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new(64)
    }
}
