//! Annotation and frame storage for Framemark.
//!
//! This crate provides:
//! - The persistence contracts the engine and API are written against
//!   (`VideoLibrary`, `AnnotationStore`, `FrameSource`)
//! - The filesystem implementation: one frame directory per video, one
//!   JSON annotation file per video, atomic full-record saves

pub mod error;
pub mod fs;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsLibrary;
pub use traits::{AnnotationStore, FrameSource, VideoLibrary};
