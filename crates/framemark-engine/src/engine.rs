//! Engine facade: playback control, navigation, and annotation ops.
//!
//! One instance per reviewer session. All mutation goes through the
//! session mutex; annotation changes enqueue a full-record save and
//! publish an event, so consumers never observe a half-applied change.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info};

use framemark_models::{
    AnnotationRecord, Difficulty, FrameSequence, VideoId, VideoStatus,
};
use framemark_store::{AnnotationStore, FrameSource, VideoLibrary};

use crate::cache::{FrameCache, FrameHandle};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::events::{EngineEvent, EventChannel};
use crate::ops;
use crate::persist::SaveQueue;
use crate::scheduler::PlaybackScheduler;
use crate::session::{LoadOptions, SessionState};

/// Wider prefetch issued once per video load, before playback settles.
const LOAD_PREFETCH_RADIUS: usize = 60;

/// The frame playback and annotation engine.
pub struct Engine {
    state: Arc<Mutex<SessionState>>,
    library: Arc<dyn VideoLibrary>,
    annotations: Arc<dyn AnnotationStore>,
    cache: FrameCache,
    saves: SaveQueue,
    events: EventChannel,
    scheduler: PlaybackScheduler,
}

impl Engine {
    pub fn new(
        library: Arc<dyn VideoLibrary>,
        annotations: Arc<dyn AnnotationStore>,
        frames: Arc<dyn FrameSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new(&config))),
            library,
            annotations: Arc::clone(&annotations),
            cache: FrameCache::new(frames),
            saves: SaveQueue::start(annotations),
            events: EventChannel::default(),
            scheduler: PlaybackScheduler::new(),
        }
    }

    /// Build an engine over one backend that plays all three store roles,
    /// such as `framemark_store::FsLibrary`.
    pub fn from_backend<B>(backend: Arc<B>, config: EngineConfig) -> Self
    where
        B: VideoLibrary + AnnotationStore + FrameSource + 'static,
    {
        Self::new(
            Arc::clone(&backend) as Arc<dyn VideoLibrary>,
            Arc::clone(&backend) as Arc<dyn AnnotationStore>,
            backend as Arc<dyn FrameSource>,
            config,
        )
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    // ---- video lifecycle ----------------------------------------------

    /// Switch the session to a video: pause, discard the cache, load the
    /// frame sequence and annotation record, position the playhead, warm
    /// the cache, and resume playback unless asked not to.
    pub async fn load_video(&self, video_id: &VideoId, opts: LoadOptions) -> EngineResult<()> {
        self.pause();
        self.cache.clear();

        let frames = FrameSequence::new(self.library.frame_sequence(video_id).await?);
        let mut record = self.annotations.load(video_id).await?;
        record.video_id = video_id.clone();
        if record.normalize_legacy_status() {
            debug!(video_id = %video_id, "Migrated legacy completed flag to done status");
        }

        let start_index = if opts.jump_to_last_label {
            frames.last_selected_position(&record).unwrap_or(0)
        } else {
            0
        };

        let frame_id = {
            let mut s = self.lock_state();
            s.video_id = Some(video_id.clone());
            s.frames = frames;
            s.record = Some(record.clone());
            s.index = start_index;
            s.last_advance = None;
            s.scrub_was_playing = false;
            s.current_frame().map(str::to_string)
        };

        self.events.annotation_changed(&record);
        if let Some(frame_id) = frame_id {
            self.events.frame_changed(start_index, frame_id);
        }

        let frame_count = {
            let s = self.lock_state();
            self.cache
                .prefetch(video_id, &s.frames, s.index, LOAD_PREFETCH_RADIUS);
            s.frames.len()
        };

        if !opts.start_paused {
            self.play();
        }
        info!(video_id = %video_id, frames = frame_count, "Loaded video");
        Ok(())
    }

    // ---- playback control ---------------------------------------------

    /// Start playback. No-op while already playing or with no frames.
    pub fn play(&self) {
        {
            let mut s = self.lock_state();
            if s.playing || s.frames.is_empty() {
                return;
            }
            s.playing = true;
            s.last_advance = Some(Instant::now());
        }
        self.scheduler
            .start(Arc::clone(&self.state), self.cache.clone(), self.events.clone());
    }

    /// Stop playback. The index stays where it is; the flag flips under
    /// the lock before the tick task is cancelled, so a tick racing the
    /// pause can never move the playhead afterwards.
    pub fn pause(&self) {
        {
            let mut s = self.lock_state();
            s.playing = false;
        }
        self.scheduler.stop();
    }

    pub fn toggle_playback(&self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.lock_state().playing
    }

    pub fn set_fps(&self, fps: u32) {
        self.lock_state().fps = fps.max(1);
    }

    pub fn set_slow_fps(&self, fps: u32) {
        self.lock_state().slow_fps = fps.max(1);
    }

    // ---- navigation ----------------------------------------------------

    /// Manual step by a signed frame delta, clamped to the sequence
    /// bounds. Pauses playback.
    pub fn step_frame(&self, delta: i64) {
        self.pause();
        let changed = {
            let mut s = self.lock_state();
            if s.frames.is_empty() {
                return;
            }
            let last = (s.frames.len() - 1) as i64;
            let target = (s.index as i64 + delta).clamp(0, last) as usize;
            if target == s.index {
                None
            } else {
                s.index = target;
                s.current_frame()
                    .map(|frame_id| (target, frame_id.to_string()))
            }
        };
        if let Some((index, frame_id)) = changed {
            self.events.frame_changed(index, frame_id);
            self.prefetch_around_current();
        }
    }

    /// Jump the playhead to a selected label. Pauses playback; a label
    /// with no sequence position is a no-op. Returns whether it resolved.
    pub fn jump_to_label(&self, label: &str) -> bool {
        self.pause();
        let jumped = {
            let mut s = self.lock_state();
            let Some(target) = s.frames.position_of(label) else {
                return false;
            };
            s.index = target;
            s.current_frame()
                .map(|frame_id| (target, frame_id.to_string()))
        };
        if let Some((index, frame_id)) = jumped {
            self.events.frame_changed(index, frame_id);
            self.prefetch_around_current();
        }
        true
    }

    /// Begin a scrub gesture: remember whether playback was running, then
    /// pause for the duration of the gesture.
    pub fn begin_scrub(&self) {
        let was_playing = {
            let mut s = self.lock_state();
            let was = s.playing;
            s.scrub_was_playing = was;
            s.playing = false;
            was
        };
        if was_playing {
            self.scheduler.stop();
        }
    }

    /// Move the playhead to a position expressed as a 0.0..=1.0 fraction
    /// of the sequence.
    pub fn scrub_to(&self, ratio: f64) {
        let moved = {
            let mut s = self.lock_state();
            if s.frames.is_empty() {
                return;
            }
            let last = (s.frames.len() - 1) as f64;
            let target = (ratio.clamp(0.0, 1.0) * last).round() as usize;
            if target == s.index {
                None
            } else {
                s.index = target;
                s.current_frame()
                    .map(|frame_id| (target, frame_id.to_string()))
            }
        };
        if let Some((index, frame_id)) = moved {
            self.events.frame_changed(index, frame_id);
            self.prefetch_around_current();
        }
    }

    /// End the scrub gesture, resuming playback if it was running when
    /// the gesture began.
    pub fn end_scrub(&self) {
        let resume = {
            let mut s = self.lock_state();
            let resume = s.scrub_was_playing;
            s.scrub_was_playing = false;
            resume
        };
        if resume {
            self.play();
        }
    }

    // ---- annotation operations ------------------------------------------

    /// Select the current frame's label. Returns `false` when it was
    /// already selected or no video is loaded.
    pub fn select_current(&self) -> bool {
        let outcome = {
            let mut s = self.lock_state();
            let Some(label) = s.current_label().map(str::to_string) else {
                return false;
            };
            let Some(record) = s.record.as_mut() else {
                return false;
            };
            if !ops::select(record, &label) {
                return false;
            }
            self.snapshot(&s)
        };
        self.commit(outcome);
        true
    }

    /// Remove the most recently selected label (stack pop).
    pub fn undo_last(&self) -> Option<String> {
        let (removed, outcome) = {
            let mut s = self.lock_state();
            let record = s.record.as_mut()?;
            let removed = ops::undo_last(record)?;
            (removed, self.snapshot(&s))
        };
        self.commit(outcome);
        Some(removed)
    }

    /// Remove the selected label closest to the playhead. Equidistant
    /// ties and unresolvable labels leave the selection alone.
    pub fn remove_closest(&self) -> Option<String> {
        let (removed, outcome) = {
            let mut s = self.lock_state();
            let index = s.index;
            let SessionState { frames, record, .. } = &mut *s;
            let removed = ops::remove_closest(record.as_mut()?, frames, index)?;
            (removed, self.snapshot(&s))
        };
        self.commit(outcome);
        Some(removed)
    }

    /// Remove a specific selected label. Returns `false` if absent.
    pub fn remove_label(&self, label: &str) -> bool {
        let outcome = {
            let mut s = self.lock_state();
            let Some(record) = s.record.as_mut() else {
                return false;
            };
            if !ops::remove_label(record, label) {
                return false;
            }
            self.snapshot(&s)
        };
        self.commit(outcome);
        true
    }

    /// Set or toggle-off the review status. Returns the resulting value.
    pub fn set_status(&self, status: VideoStatus) -> Option<VideoStatus> {
        let (result, outcome) = {
            let mut s = self.lock_state();
            let record = s.record.as_mut()?;
            let result = ops::toggle_status(record, status);
            (result, self.snapshot(&s))
        };
        self.commit(outcome);
        result
    }

    /// Set or toggle-off the difficulty. Returns the resulting value.
    pub fn set_difficulty(&self, difficulty: Difficulty) -> Option<Difficulty> {
        let (result, outcome) = {
            let mut s = self.lock_state();
            let record = s.record.as_mut()?;
            let result = ops::toggle_difficulty(record, difficulty);
            (result, self.snapshot(&s))
        };
        self.commit(outcome);
        result
    }

    // ---- accessors ------------------------------------------------------

    pub fn current_video(&self) -> Option<VideoId> {
        self.lock_state().video_id.clone()
    }

    pub fn current_index(&self) -> Option<usize> {
        let s = self.lock_state();
        s.video_id.as_ref().map(|_| s.index)
    }

    pub fn frame_count(&self) -> usize {
        self.lock_state().frames.len()
    }

    /// Snapshot of the current annotation record.
    pub fn annotation(&self) -> Option<AnnotationRecord> {
        self.lock_state().record.clone()
    }

    /// Selected labels in sequence order, for marker display.
    pub fn sorted_selected(&self) -> Vec<String> {
        let s = self.lock_state();
        match &s.record {
            Some(record) => s.frames.sort_labels_by_position(&record.selected_frames),
            None => Vec::new(),
        }
    }

    /// Cache handle for the current frame's image.
    pub fn current_frame_handle(&self) -> Option<FrameHandle> {
        let s = self.lock_state();
        let video_id = s.video_id.as_ref()?;
        let frame_id = s.current_frame()?;
        Some(self.cache.get(video_id, frame_id))
    }

    // ---- internals ------------------------------------------------------

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Persistence payload for a just-mutated session. Call under the lock.
    fn snapshot(&self, s: &SessionState) -> Option<(VideoId, AnnotationRecord)> {
        match (&s.video_id, &s.record) {
            (Some(video_id), Some(record)) => Some((video_id.clone(), record.clone())),
            _ => None,
        }
    }

    /// Enqueue the save and publish the annotation event.
    fn commit(&self, outcome: Option<(VideoId, AnnotationRecord)>) {
        if let Some((video_id, record)) = outcome {
            self.saves.enqueue(video_id, record.clone());
            self.events.annotation_changed(&record);
        }
    }

    fn prefetch_around_current(&self) {
        let s = self.lock_state();
        if let Some(video_id) = &s.video_id {
            self.cache
                .prefetch(video_id, &s.frames, s.index, crate::cache::DEFAULT_PREFETCH_RADIUS);
        }
    }
}
