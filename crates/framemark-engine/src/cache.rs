//! Frame image cache and prefetch.
//!
//! Loads are fire-and-forget: `get` returns a handle immediately and the
//! image bytes arrive through a watch channel. The cache is unbounded for
//! the session and cleared wholesale on every video switch; in-flight
//! loads for the previous video are discarded, never awaited.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::debug;

use framemark_models::{FrameSequence, VideoId};
use framemark_store::FrameSource;

/// How far behind the focal index the prefetch window reaches.
const PREFETCH_BEHIND: usize = 10;

/// Default forward prefetch radius.
pub const DEFAULT_PREFETCH_RADIUS: usize = 40;

#[derive(Debug, Clone)]
enum LoadState {
    Loading,
    Ready(Arc<Vec<u8>>),
    Failed,
}

/// Handle to a cached (or still loading) frame image.
#[derive(Debug, Clone)]
pub struct FrameHandle {
    rx: watch::Receiver<LoadState>,
}

impl FrameHandle {
    /// Bytes if the load already completed.
    pub fn try_data(&self) -> Option<Arc<Vec<u8>>> {
        match &*self.rx.borrow() {
            LoadState::Ready(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    /// Whether the load failed. A later `get` for the same frame
    /// re-issues the load.
    pub fn is_failed(&self) -> bool {
        matches!(&*self.rx.borrow(), LoadState::Failed)
    }

    /// One-shot completion hook: resolves with the bytes once loaded, or
    /// `None` if the load failed or the cache entry was discarded.
    pub async fn ready(&self) -> Option<Arc<Vec<u8>>> {
        let mut rx = self.rx.clone();
        loop {
            {
                match &*rx.borrow() {
                    LoadState::Ready(data) => return Some(Arc::clone(data)),
                    LoadState::Failed => return None,
                    LoadState::Loading => {}
                }
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

struct Entry {
    tx: watch::Sender<LoadState>,
    handle: FrameHandle,
}

struct CacheInner {
    source: Arc<dyn FrameSource>,
    entries: Mutex<HashMap<String, Entry>>,
}

/// Frame image cache keyed by frame identifier.
#[derive(Clone)]
pub struct FrameCache {
    inner: Arc<CacheInner>,
}

impl FrameCache {
    pub fn new(source: Arc<dyn FrameSource>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Fetch-or-reuse: returns the cached handle if present, otherwise
    /// registers a new entry and spawns its load. Entries whose load
    /// failed are retried here.
    pub fn get(&self, video_id: &VideoId, frame_id: &str) -> FrameHandle {
        let mut entries = self
            .inner
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = entries.get(frame_id) {
            if entry.handle.is_failed() {
                let _ = entry.tx.send(LoadState::Loading);
                self.spawn_load(video_id.clone(), frame_id.to_string(), entry.tx.clone());
            }
            return entry.handle.clone();
        }

        let (tx, rx) = watch::channel(LoadState::Loading);
        let handle = FrameHandle { rx };
        self.spawn_load(video_id.clone(), frame_id.to_string(), tx.clone());
        entries.insert(
            frame_id.to_string(),
            Entry {
                tx,
                handle: handle.clone(),
            },
        );
        handle
    }

    /// Request every frame in the window around `focal`, clamped to the
    /// sequence bounds. Side effect only.
    pub fn prefetch(&self, video_id: &VideoId, frames: &FrameSequence, focal: usize, radius: usize) {
        if frames.is_empty() {
            return;
        }
        let start = focal.saturating_sub(PREFETCH_BEHIND);
        let end = (focal + radius).min(frames.len() - 1);
        for index in start..=end {
            if let Some(frame_id) = frames.filename_at(index) {
                self.get(video_id, frame_id);
            }
        }
    }

    /// Drop all entries. Called on every video switch.
    pub fn clear(&self) {
        let mut entries = self
            .inner
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Number of cached (or loading) entries.
    pub fn len(&self) -> usize {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn spawn_load(&self, video_id: VideoId, frame_id: String, tx: watch::Sender<LoadState>) {
        let source = Arc::clone(&self.inner.source);
        tokio::spawn(async move {
            match source.load_frame(&video_id, &frame_id).await {
                Ok(bytes) => {
                    let _ = tx.send(LoadState::Ready(Arc::new(bytes)));
                }
                Err(e) => {
                    debug!(frame_id = %frame_id, error = %e, "Frame load failed");
                    let _ = tx.send(LoadState::Failed);
                }
            }
        });
    }
}
