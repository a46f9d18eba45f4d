//! Errors reported by the command surface.

use localenv_store::StoreError;
use thiserror::Error;

/// Errors from dispatching a store method.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The method name is not in the method table.
    #[error("unknown method {0}")]
    UnknownMethod(String),

    /// Wrong argument count or an empty name.
    #[error("{0}")]
    Validation(String),

    /// The value is absent, or secret and therefore not disclosed.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
