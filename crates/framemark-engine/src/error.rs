//! Engine error types.
//!
//! Resolution failures (a label with no sequence position) and ambiguous
//! removal ties are deliberate no-ops, not errors; only collaborator
//! failures surface here.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur inside the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Store error: {0}")]
    Store(#[from] framemark_store::StoreError),
}
