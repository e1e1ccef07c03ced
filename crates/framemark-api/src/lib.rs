//! Axum HTTP API server.
//!
//! Exposes the filesystem library over HTTP: video listing, frame
//! sequences, frame image bytes, and annotation records. A thin layer —
//! all semantics live in `framemark-store` and the shared models.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
