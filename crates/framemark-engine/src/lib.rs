//! Frame playback and annotation engine.
//!
//! This crate owns the reviewer session: which frame is current, the
//! adaptive playback clock, the frame-image cache and prefetch policy,
//! and the annotation state machine with its append-only history log.
//! Rendering surfaces subscribe to [`EngineEvent`]s; persistence goes
//! through the `framemark-store` traits.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ops;
pub mod persist;
pub mod scheduler;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::{FrameCache, FrameHandle, DEFAULT_PREFETCH_RADIUS};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use events::{EngineEvent, EventChannel};
pub use ops::SLOWDOWN_RADIUS;
pub use session::{LoadOptions, SessionState};
