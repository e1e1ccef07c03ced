//! Frame sequences and label resolution.

use std::collections::HashMap;

use crate::annotation::AnnotationRecord;

/// Strip the storage-format suffix from a frame filename.
///
/// `"frame_000042.jpg"` -> `"frame_000042"`. Filenames without an
/// extension are returned unchanged.
pub fn label_of(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename)
}

/// The ordered, immutable-for-the-session frame list of the active video.
///
/// Carries a label -> position index built once at load time; every label
/// lookup in the engine goes through it. A label that resolves to no
/// position is a valid, silently-ignored case.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FrameSequence {
    /// Build a sequence from ordered frame filenames.
    pub fn new(frames: Vec<String>) -> Self {
        let positions = frames
            .iter()
            .enumerate()
            .map(|(i, f)| (label_of(f).to_string(), i))
            .collect();
        Self { frames, positions }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Ordered frame filenames.
    pub fn filenames(&self) -> &[String] {
        &self.frames
    }

    /// Filename at a sequence position.
    pub fn filename_at(&self, index: usize) -> Option<&str> {
        self.frames.get(index).map(String::as_str)
    }

    /// Label at a sequence position.
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.frames.get(index).map(|f| label_of(f))
    }

    /// Sequence position of a label, if the label names a frame here.
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Sort labels by sequence position for display; labels that do not
    /// resolve keep out of the way at the end.
    pub fn sort_labels_by_position(&self, labels: &[String]) -> Vec<String> {
        let mut sorted: Vec<String> = labels.to_vec();
        sorted.sort_by_key(|l| self.position_of(l).unwrap_or(usize::MAX));
        sorted
    }

    /// Position of the most-recently-inserted selected label that still
    /// resolves in this sequence.
    pub fn last_selected_position(&self, record: &AnnotationRecord) -> Option<usize> {
        record
            .selected_frames
            .iter()
            .rev()
            .find_map(|label| self.position_of(label))
    }
}
