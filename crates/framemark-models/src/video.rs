//! Video listing models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a video (the name of its frame directory).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Review status assigned by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Review finished
    Done,
    /// Skipped, not worth reviewing
    Skip,
    /// Needs a second look
    Review,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Done => "done",
            VideoStatus::Skip => "skip",
            VideoStatus::Review => "review",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Difficulty level assigned by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the video listing shown to the reviewer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Video ID (frame directory name)
    pub id: VideoId,

    /// Total number of frames in the sequence
    pub frame_count: usize,

    /// Number of selected (labeled) frames
    pub selected_count: usize,

    /// Whether any frames are selected
    pub annotated: bool,

    /// Legacy mirror of `status == done`
    pub completed: bool,

    /// Review status, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,

    /// Difficulty level, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl Video {
    /// Listing rank: in-progress videos first, finished ones last.
    ///
    /// 0 = in-progress (annotated, no status), 1 = untouched,
    /// 2 = skip, 3 = review, 4 = done.
    fn sort_rank(&self) -> u8 {
        match self.status {
            Some(VideoStatus::Skip) => 2,
            Some(VideoStatus::Review) => 3,
            Some(VideoStatus::Done) => 4,
            None if self.annotated => 0,
            None => 1,
        }
    }
}

/// Sort a video listing into sidebar order (rank, then id).
pub fn sort_videos(videos: &mut [Video]) {
    videos.sort_by(|a, b| {
        a.sort_rank()
            .cmp(&b.sort_rank())
            .then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });
}
