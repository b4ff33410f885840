//! Error types for the muleflow engine.

use thiserror::Error;

/// Result type alias using `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur around the detection pipeline.
///
/// The detection core itself never fails on a valid graph: detectors treat
/// empty adjacency, zero-length lists, and non-matching windows as "no
/// candidates". Errors originate at the ingestion boundary or indicate an
/// invariant violation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A parsed transaction violates the input contract.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    ValidationError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error (invariant violation; indicates a bug).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl EngineError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::ValidationError(msg.into())
    }

    /// Create an invalid-transaction error.
    #[must_use]
    pub fn invalid_transaction(msg: impl Into<String>) -> Self {
        EngineError::InvalidTransaction(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::InternalError(msg.into())
    }

    /// Returns true if this is a recoverable error.
    ///
    /// Recoverable errors describe rejected input; the caller can fix the
    /// input and retry. Internal errors are not recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidTransaction(_)
                | EngineError::ValidationError(_)
                | EngineError::SerializationError(_)
        )
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationError(err.to_string())
    }
}
