//! Annotation state-machine operations.
//!
//! Pure mutations over `(AnnotationRecord, FrameSequence)`. Every change
//! appends exactly one history entry; no-ops append none. The history is
//! an audit trail only — undo pops the selection order, it never replays
//! the log.

use framemark_models::{
    AnnotationRecord, Difficulty, FrameSequence, HistoryAction, VideoStatus,
};

/// Frames on either side of a selected label where playback slows down.
pub const SLOWDOWN_RADIUS: usize = 5;

/// Add a label to the selection. No-op if already selected.
pub fn select(record: &mut AnnotationRecord, label: &str) -> bool {
    if record.selected_frames.iter().any(|f| f == label) {
        return false;
    }
    record.selected_frames.push(label.to_string());
    record.push_history(HistoryAction::Select {
        frame: label.to_string(),
    });
    true
}

/// Remove the last-added label (stack pop, not position-based).
pub fn undo_last(record: &mut AnnotationRecord) -> Option<String> {
    let removed = record.selected_frames.pop()?;
    record.push_history(HistoryAction::Undo {
        removed_frame: removed.clone(),
    });
    Some(removed)
}

/// Remove a specific label. No-op if absent.
pub fn remove_label(record: &mut AnnotationRecord, label: &str) -> bool {
    let Some(pos) = record.selected_frames.iter().position(|f| f == label) else {
        return false;
    };
    record.selected_frames.remove(pos);
    record.push_history(HistoryAction::Undo {
        removed_frame: label.to_string(),
    });
    true
}

/// Remove the selected label closest to `current_index`.
///
/// Labels without a sequence position are skipped. If more than one label
/// attains the minimum distance, the removal is ambiguous and nothing
/// happens.
pub fn remove_closest(
    record: &mut AnnotationRecord,
    frames: &FrameSequence,
    current_index: usize,
) -> Option<String> {
    let candidates: Vec<(String, usize)> = record
        .selected_frames
        .iter()
        .filter_map(|label| {
            frames
                .position_of(label)
                .map(|pos| (label.clone(), pos.abs_diff(current_index)))
        })
        .collect();

    let min_dist = candidates.iter().map(|(_, d)| *d).min()?;
    let mut closest = candidates.iter().filter(|(_, d)| *d == min_dist);
    let (label, _) = closest.next()?;
    if closest.next().is_some() {
        // Equidistant tie: ambiguous, leave the selection alone.
        return None;
    }

    let label = label.clone();
    remove_label(record, &label);
    Some(label)
}

/// Set or toggle-off the review status, mirroring the legacy `completed`
/// flag. Returns the resulting status.
pub fn toggle_status(record: &mut AnnotationRecord, status: VideoStatus) -> Option<VideoStatus> {
    record.status = if record.status == Some(status) {
        None
    } else {
        Some(status)
    };
    record.completed = record.status == Some(VideoStatus::Done);
    record.push_history(HistoryAction::SetStatus {
        status: record.status,
    });
    record.status
}

/// Set or toggle-off the difficulty. Returns the resulting value.
pub fn toggle_difficulty(
    record: &mut AnnotationRecord,
    difficulty: Difficulty,
) -> Option<Difficulty> {
    record.difficulty = if record.difficulty == Some(difficulty) {
        None
    } else {
        Some(difficulty)
    };
    record.push_history(HistoryAction::SetDifficulty {
        difficulty: record.difficulty,
    });
    record.difficulty
}

/// Whether `index` is within `radius` frames of any selected label.
pub fn near_selected(
    record: &AnnotationRecord,
    frames: &FrameSequence,
    index: usize,
    radius: usize,
) -> bool {
    record.selected_frames.iter().any(|label| {
        frames
            .position_of(label)
            .is_some_and(|pos| pos.abs_diff(index) <= radius)
    })
}
