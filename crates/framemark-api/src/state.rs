//! Application state.

use std::sync::Arc;

use framemark_store::{FsLibrary, StoreResult};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub library: Arc<FsLibrary>,
}

impl AppState {
    /// Create new application state over the configured directories.
    pub fn new(config: ApiConfig) -> StoreResult<Self> {
        let library = FsLibrary::new(&config.frames_dir, &config.annotations_dir)?;
        Ok(Self {
            config,
            library: Arc::new(library),
        })
    }
}
