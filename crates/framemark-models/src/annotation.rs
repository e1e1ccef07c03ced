//! Annotation records and their append-only history log.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::{Difficulty, VideoId, VideoStatus};

/// One mutation recorded in the history log.
///
/// The history is an audit trail, not an undo stack: `undo` decisions are
/// made from the selection order, never replayed from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HistoryAction {
    /// A frame label was added to the selection.
    Select { frame: String },
    /// A frame label was removed (undo, closest-removal, or explicit).
    Undo { removed_frame: String },
    /// Review status changed; `None` means it was toggled off.
    SetStatus { status: Option<VideoStatus> },
    /// Difficulty changed; `None` means it was toggled off.
    SetDifficulty { difficulty: Option<Difficulty> },
}

/// A timestamped history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub action: HistoryAction,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn now(action: HistoryAction) -> Self {
        Self {
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Per-video annotation record.
///
/// Mutated exclusively through the engine's state-machine operations;
/// persisted as a whole after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotationRecord {
    /// Owning video ID
    pub video_id: VideoId,

    /// Selected frame labels, in insertion order, no duplicates
    #[serde(default)]
    pub selected_frames: Vec<String>,

    /// Append-only mutation log
    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    /// Review status, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,

    /// Difficulty level, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    /// Legacy flag, kept mirror-consistent with `status == done`
    #[serde(default)]
    pub completed: bool,

    /// Stamped by the store on every save
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl AnnotationRecord {
    /// Create an empty record for a video.
    pub fn empty(video_id: VideoId) -> Self {
        Self {
            video_id,
            selected_frames: Vec::new(),
            history: Vec::new(),
            status: None,
            difficulty: None,
            completed: false,
            last_modified: None,
        }
    }

    /// Whether any frames are selected.
    pub fn is_annotated(&self) -> bool {
        !self.selected_frames.is_empty()
    }

    /// Migrate records written before the `status` field existed.
    ///
    /// `completed == true` with no status becomes `status = done`.
    /// Returns `true` if the record was changed.
    pub fn normalize_legacy_status(&mut self) -> bool {
        if self.status.is_none() && self.completed {
            self.status = Some(VideoStatus::Done);
            return true;
        }
        false
    }

    /// Append a timestamped entry to the history log.
    pub fn push_history(&mut self, action: HistoryAction) {
        self.history.push(HistoryEntry::now(action));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_wire_format() {
        let entry = HistoryEntry::now(HistoryAction::Select {
            frame: "frame_000042".to_string(),
        });
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["action"], "select");
        assert_eq!(json["frame"], "frame_000042");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_status_toggle_off_serializes_null() {
        let entry = HistoryEntry::now(HistoryAction::SetStatus { status: None });
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["action"], "set_status");
        assert!(json["status"].is_null());
    }

    #[test]
    fn test_parse_original_history_json() {
        let raw = r#"{
            "action": "undo",
            "removed_frame": "frame_000007",
            "timestamp": "2025-11-03T10:15:30.000Z"
        }"#;
        let entry: HistoryEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(
            entry.action,
            HistoryAction::Undo {
                removed_frame: "frame_000007".to_string()
            }
        );
    }

    #[test]
    fn test_legacy_completed_migration() {
        let raw = r#"{"video_id": "vid_a", "selected_frames": [], "history": [], "completed": true}"#;
        let mut record: AnnotationRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.status, None);

        assert!(record.normalize_legacy_status());
        assert_eq!(record.status, Some(VideoStatus::Done));

        // Already-migrated records are left alone
        assert!(!record.normalize_legacy_status());
    }

    #[test]
    fn test_no_migration_without_completed() {
        let mut record = AnnotationRecord::empty(VideoId::from("vid_a"));
        assert!(!record.normalize_legacy_status());
        assert_eq!(record.status, None);
    }
}
