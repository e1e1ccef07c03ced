//! Adaptive playback scheduler.
//!
//! Two states: Paused (no task) and Playing (one spawned tick task). The
//! tick polls on a short interval and advances the current index once the
//! adaptive frame interval has elapsed, wrapping past the last frame.
//! Rate changes take effect on the next tick without a restart. The whole
//! tick body runs under the session lock with no awaits, so stopping the
//! task between ticks can never leave a half-applied advance behind.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};

use crate::cache::{FrameCache, DEFAULT_PREFETCH_RADIUS};
use crate::events::EventChannel;
use crate::ops;
use crate::session::SessionState;

/// Polling interval of the tick task.
const TICK_INTERVAL: Duration = Duration::from_millis(5);

/// Timer-driven playback loop.
pub struct PlaybackScheduler {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self {
            task: Mutex::new(None),
        }
    }

    /// Whether the tick task is running.
    pub fn is_running(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Spawn the tick task. The caller sets `playing` and the advance
    /// baseline before starting. No-op if already running.
    pub(crate) fn start(
        &self,
        state: Arc<Mutex<SessionState>>,
        cache: FrameCache,
        events: EventChannel,
    ) {
        let mut slot = self.lock_task();
        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }
        *slot = Some(tokio::spawn(async move {
            loop {
                sleep(TICK_INTERVAL).await;
                tick(&state, &cache, &events);
            }
        }));
    }

    /// Cancel the pending tick synchronously. No-op if already stopped.
    pub(crate) fn stop(&self) {
        if let Some(task) = self.lock_task().take() {
            task.abort();
        }
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// One scheduler tick: advance the index if the adaptive interval has
/// elapsed, then notify and prefetch.
fn tick(state: &Mutex<SessionState>, cache: &FrameCache, events: &EventChannel) {
    let mut s = state.lock().unwrap_or_else(|e| e.into_inner());
    if !s.playing || s.frames.is_empty() {
        return;
    }

    let interval = Duration::from_secs_f64(1.0 / f64::from(effective_fps(&s)));
    let now = Instant::now();
    let due = match s.last_advance {
        Some(last) => now.duration_since(last) >= interval,
        None => true,
    };
    if !due {
        return;
    }

    s.index = if s.index + 1 < s.frames.len() {
        s.index + 1
    } else {
        0
    };
    s.last_advance = Some(now);

    if let Some(frame_id) = s.current_frame().map(str::to_string) {
        events.frame_changed(s.index, frame_id);
    }
    if let Some(video_id) = s.video_id.clone() {
        cache.prefetch(&video_id, &s.frames, s.index, DEFAULT_PREFETCH_RADIUS);
    }
}

/// Slow rate within the slowdown radius of any selected label, normal
/// rate otherwise.
pub(crate) fn effective_fps(s: &SessionState) -> u32 {
    let near = s.record.as_ref().is_some_and(|record| {
        ops::near_selected(record, &s.frames, s.index, ops::SLOWDOWN_RADIUS)
    });
    if near {
        s.slow_fps
    } else {
        s.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use framemark_models::{AnnotationRecord, FrameSequence, VideoId};

    fn state_with_selection(selected_pos: usize, index: usize) -> SessionState {
        let mut s = SessionState::new(&EngineConfig { fps: 30, slow_fps: 5 });
        s.frames = FrameSequence::new(
            (0..100).map(|i| format!("frame_{:03}.jpg", i)).collect(),
        );
        let mut record = AnnotationRecord::empty(VideoId::from("vid"));
        record
            .selected_frames
            .push(format!("frame_{:03}", selected_pos));
        s.record = Some(record);
        s.index = index;
        s
    }

    #[test]
    fn test_effective_fps_at_boundary_distances() {
        // Distance 5: slow rate
        let s = state_with_selection(20, 15);
        assert_eq!(effective_fps(&s), 5);

        // Distance 6: normal rate
        let s = state_with_selection(20, 14);
        assert_eq!(effective_fps(&s), 30);
    }

    #[test]
    fn test_effective_fps_without_record() {
        let mut s = state_with_selection(20, 20);
        s.record = None;
        assert_eq!(effective_fps(&s), 30);
    }
}
