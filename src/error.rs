//! Error types with actionable diagnostics.
//!
//! Contract violations (empty or mismatched data) are `Validation`. Persistence
//! failures are `Storage`. Lookups of unknown versions are `NotFound`.
//! Training failures are `Retrain`; the pipeline records those as failed
//! retrain results instead of propagating them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the continuous learning pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or empty input to an evaluation or drift call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Artifact or ledger read/write failure.
    #[error("Storage error: {message}\n  → Check permissions on the model directory and retry")]
    Storage { message: String },

    /// Unknown version id, or no production version.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Training raised an error.
    #[error("Retrain failed: {0}")]
    Retrain(String),

    /// Configuration could not be read or is out of range.
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Model or ledger (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error for a field.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the caller may reasonably retry (with backoff).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Io { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_is_retryable() {
        assert!(Error::storage("disk full").is_retryable());
        assert!(!Error::Validation("empty".into()).is_retryable());
        assert!(!Error::NotFound("v_1".into()).is_retryable());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = Error::io("writing ledger", std::io::Error::other("denied"));
        let msg = err.to_string();
        assert!(msg.contains("writing ledger"));
        assert!(msg.contains("denied"));

        let err = Error::config("pipeline.yaml", "drift.threshold must be > 0");
        assert!(err.to_string().contains("pipeline.yaml"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
