//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Failed to configure store: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn video_not_found(id: impl Into<String>) -> Self {
        Self::VideoNotFound(id.into())
    }

    pub fn frame_not_found(id: impl Into<String>) -> Self {
        Self::FrameNotFound(id.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
