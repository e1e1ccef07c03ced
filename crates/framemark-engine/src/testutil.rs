//! In-memory store backend for engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use framemark_models::{label_of, AnnotationRecord, Video, VideoId};
use framemark_store::{
    AnnotationStore, FrameSource, StoreError, StoreResult, VideoLibrary,
};

/// Fake backend that records every frame load and annotation save, with
/// switches to make either fail.
pub struct MemoryLibrary {
    frames: HashMap<String, Vec<String>>,
    records: Mutex<HashMap<String, AnnotationRecord>>,
    frame_load_log: Mutex<Vec<String>>,
    save_log: Mutex<Vec<(String, usize)>>,
    save_attempts: AtomicUsize,
    fail_frames: AtomicBool,
    fail_saves: AtomicBool,
    notify: Notify,
}

impl MemoryLibrary {
    /// One video with `count` frames named `frame_000000.jpg` onward.
    pub fn with_video(id: &str, count: usize) -> Self {
        let mut frames = HashMap::new();
        frames.insert(
            id.to_string(),
            (0..count).map(|i| format!("frame_{:06}.jpg", i)).collect(),
        );
        Self {
            frames,
            records: Mutex::new(HashMap::new()),
            frame_load_log: Mutex::new(Vec::new()),
            save_log: Mutex::new(Vec::new()),
            save_attempts: AtomicUsize::new(0),
            fail_frames: AtomicBool::new(false),
            fail_saves: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Seed a stored annotation record.
    pub fn insert_record(&self, record: AnnotationRecord) {
        self.lock(&self.records)
            .insert(record.video_id.as_str().to_string(), record);
    }

    /// Total completed frame loads.
    pub fn frame_loads(&self) -> usize {
        self.lock(&self.frame_load_log).len()
    }

    /// Frame filenames loaded so far, in request order.
    pub fn frame_load_log(&self) -> Vec<String> {
        self.lock(&self.frame_load_log).clone()
    }

    /// Successful saves so far: (video id, selected-frame count).
    pub fn save_log(&self) -> Vec<(String, usize)> {
        self.lock(&self.save_log).clone()
    }

    pub fn set_fail_frames(&self, fail: bool) {
        self.fail_frames.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Wait until at least `n` frame loads have been recorded.
    pub async fn wait_frame_loads(&self, n: usize) {
        self.wait_until(|| self.frame_loads() >= n).await;
    }

    /// Wait until at least `n` saves have succeeded.
    pub async fn wait_saves(&self, n: usize) {
        self.wait_until(|| self.lock(&self.save_log).len() >= n).await;
    }

    /// Wait until at least `n` saves have been attempted, failed or not.
    pub async fn wait_save_attempts(&self, n: usize) {
        self.wait_until(|| self.save_attempts.load(Ordering::SeqCst) >= n)
            .await;
    }

    async fn wait_until(&self, cond: impl Fn() -> bool) {
        loop {
            let notified = self.notify.notified();
            if cond() {
                return;
            }
            notified.await;
        }
    }

    fn lock<'a, T>(&self, m: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        m.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl VideoLibrary for MemoryLibrary {
    async fn list_videos(&self) -> StoreResult<Vec<Video>> {
        let records = self.lock(&self.records);
        let mut videos: Vec<Video> = self
            .frames
            .iter()
            .map(|(id, frames)| {
                let record = records.get(id);
                Video {
                    id: VideoId::from(id.as_str()),
                    frame_count: frames.len(),
                    selected_count: record.map_or(0, |r| r.selected_frames.len()),
                    annotated: record.is_some_and(|r| r.is_annotated()),
                    completed: record.is_some_and(|r| r.completed),
                    status: record.and_then(|r| r.status),
                    difficulty: record.and_then(|r| r.difficulty),
                }
            })
            .collect();
        framemark_models::sort_videos(&mut videos);
        Ok(videos)
    }

    async fn frame_sequence(&self, video_id: &VideoId) -> StoreResult<Vec<String>> {
        self.frames
            .get(video_id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::video_not_found(video_id.as_str()))
    }
}

#[async_trait]
impl AnnotationStore for MemoryLibrary {
    async fn load(&self, video_id: &VideoId) -> StoreResult<AnnotationRecord> {
        Ok(self
            .lock(&self.records)
            .get(video_id.as_str())
            .cloned()
            .unwrap_or_else(|| AnnotationRecord::empty(video_id.clone())))
    }

    async fn save(&self, video_id: &VideoId, record: &AnnotationRecord) -> StoreResult<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            self.notify.notify_waiters();
            return Err(StoreError::config_error("save disabled"));
        }
        self.lock(&self.save_log)
            .push((video_id.as_str().to_string(), record.selected_frames.len()));
        self.lock(&self.records)
            .insert(video_id.as_str().to_string(), record.clone());
        self.notify.notify_waiters();
        Ok(())
    }
}

#[async_trait]
impl FrameSource for MemoryLibrary {
    async fn load_frame(&self, video_id: &VideoId, frame_id: &str) -> StoreResult<Vec<u8>> {
        let known = self
            .frames
            .get(video_id.as_str())
            .is_some_and(|frames| frames.iter().any(|f| f == frame_id));
        if !known {
            self.notify.notify_waiters();
            return Err(StoreError::frame_not_found(frame_id));
        }

        if self.fail_frames.load(Ordering::SeqCst) {
            self.lock(&self.frame_load_log)
                .push(frame_id.to_string());
            self.notify.notify_waiters();
            return Err(StoreError::frame_not_found(frame_id));
        }

        self.lock(&self.frame_load_log)
            .push(frame_id.to_string());
        self.notify.notify_waiters();
        Ok(format!("jpeg:{}", label_of(frame_id)).into_bytes())
    }
}
