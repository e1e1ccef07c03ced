//! API configuration.

use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Root directory holding one frame directory per video
    pub frames_dir: PathBuf,
    /// Directory holding `{video_id}.json` annotation records
    pub annotations_dir: PathBuf,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            frames_dir: PathBuf::from("frames"),
            annotations_dir: PathBuf::from("annotations"),
            cors_origins: vec!["*".to_string()],
            max_body_size: 4 * 1024 * 1024, // 4MB, records are small
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            frames_dir: std::env::var("FRAMEMARK_FRAMES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.frames_dir),
            annotations_dir: std::env::var("FRAMEMARK_ANNOTATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.annotations_dir),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
