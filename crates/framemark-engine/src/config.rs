//! Engine configuration.

/// Playback configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Normal playback rate (frames per second)
    pub fps: u32,
    /// Rate used near a selected frame
    pub slow_fps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { fps: 30, slow_fps: 5 }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fps: std::env::var("FRAMEMARK_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.fps),
            slow_fps: std::env::var("FRAMEMARK_SLOW_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.slow_fps),
        }
    }
}
