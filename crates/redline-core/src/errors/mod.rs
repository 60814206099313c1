//! Error taxonomy for the Redline workspace.
//!
//! One thiserror enum per subsystem, wrapped by [`RedlineError`].
//! Recoverable conditions (a single source down, the reranker down, a
//! failed fusion plan) are modeled as degraded values, not errors — only
//! truly exceptional states reach this module.

mod catalog_error;
mod config_error;
mod generation_error;
mod retrieval_error;
mod session_error;

pub use catalog_error::CatalogError;
pub use config_error::ConfigError;
pub use generation_error::GenerationError;
pub use retrieval_error::{RerankError, RetrievalError};
pub use session_error::SessionError;

/// Top-level error for all Redline subsystems.
#[derive(Debug, thiserror::Error)]
pub enum RedlineError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Rerank(#[from] RerankError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience alias used across the workspace.
pub type RedlineResult<T> = Result<T, RedlineError>;
