//! Shared data models for the Framemark annotation tool.
//!
//! This crate provides Serde-serializable types for:
//! - Video listing entries and review status
//! - Annotation records with their append-only history log
//! - Frame sequences and label/position resolution

pub mod annotation;
pub mod frame;
pub mod video;

// Re-export common types
pub use annotation::{AnnotationRecord, HistoryAction, HistoryEntry};
pub use frame::{label_of, FrameSequence};
pub use video::{sort_videos, Difficulty, Video, VideoId, VideoStatus};
