//! Error types for cla-gate-state

use thiserror::Error;

/// Errors that can occur in the record store layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// No record stored under this key
    #[error("Audit record not found: {key}")]
    NotFound { key: String },

    /// Records are written once and never replaced
    #[error("Audit record already exists: {key}")]
    DuplicateKey { key: String },

    /// Key contains characters outside `[A-Za-z0-9-]` or is empty
    #[error("Invalid audit key: {key:?}")]
    InvalidKey { key: String },

    /// Backend connection or query failure
    #[error("Record store backend failed: {0}")]
    Backend(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
