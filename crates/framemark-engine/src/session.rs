//! Reviewer session state.

use tokio::time::Instant;

use framemark_models::{AnnotationRecord, FrameSequence, VideoId};

use crate::config::EngineConfig;

/// Options for loading a video.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Leave playback paused after the load.
    pub start_paused: bool,
    /// Jump to the most-recently-inserted selected label that resolves.
    pub jump_to_last_label: bool,
}

/// The single source of truth for "current video / current frame".
///
/// One instance per engine, held behind a mutex; the scheduler tick and
/// every manual operation go through it, and nothing awaits while the
/// lock is held.
#[derive(Debug)]
pub struct SessionState {
    pub video_id: Option<VideoId>,
    pub frames: FrameSequence,
    pub record: Option<AnnotationRecord>,
    pub index: usize,
    pub playing: bool,
    pub fps: u32,
    pub slow_fps: u32,
    /// Baseline for the adaptive playback clock.
    pub last_advance: Option<Instant>,
    /// Whether playback was running when the current scrub began.
    pub scrub_was_playing: bool,
}

impl SessionState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            video_id: None,
            frames: FrameSequence::default(),
            record: None,
            index: 0,
            playing: false,
            fps: config.fps.max(1),
            slow_fps: config.slow_fps.max(1),
            last_advance: None,
            scrub_was_playing: false,
        }
    }

    /// Frame filename at the current index.
    pub fn current_frame(&self) -> Option<&str> {
        self.frames.filename_at(self.index)
    }

    /// Label of the current frame.
    pub fn current_label(&self) -> Option<&str> {
        self.frames.label_at(self.index)
    }
}
