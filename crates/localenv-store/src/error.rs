//! Error types for the store.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Empty or malformed input (name, argument count).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lookup of an absent value, or of a value that may not be disclosed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Key derivation or cipher construction failed.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Authentication failure or malformed ciphertext token.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Directory or file I/O failed.
    #[error("Persistence error: {message}: {source}")]
    Persistence {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Durable content could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn persistence(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            message: message.into(),
            source,
        }
    }
}

/// Convenience result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
