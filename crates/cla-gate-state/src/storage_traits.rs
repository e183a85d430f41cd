//! Storage trait definitions for CLA Gate
//!
//! `RecordStore` is a key-value capability with put-once semantics:
//! a key is written exactly once and read any number of times afterwards.
//! There is no update or delete.
//!
//! Payloads are opaque JSON documents; the core crate decides what goes in
//! them. In-memory fakes are provided for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Opaque identifier referencing one persisted audit record.
///
/// Generated keys are UUID v4 strings. Keys parsed from outside (a details
/// link, a CLI argument) are restricted to ASCII alphanumerics and `-` so a
/// key can never name a path outside a store's root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditKey(String);

impl AuditKey {
    /// Generate a fresh, globally unique key.
    pub fn generate() -> Self {
        AuditKey(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AuditKey {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(StorageError::InvalidKey { key: s });
        }
        Ok(AuditKey(s))
    }
}

impl std::str::FromStr for AuditKey {
    type Err = StorageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AuditKey::try_from(s.to_string())
    }
}

impl std::fmt::Display for AuditKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Put-once key-value store for audit records.
///
/// Guarantees:
/// - `put(key, doc)` fails with `StorageError::DuplicateKey` if `key` exists.
/// - `get(key)` returns the exact document previously stored.
/// - `get` on an unknown key fails with `StorageError::NotFound`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a document under `key`.
    async fn put(&self, key: &AuditKey, record: serde_json::Value) -> StorageResult<()>;

    /// Retrieve the document stored under `key`.
    async fn get(&self, key: &AuditKey) -> StorageResult<serde_json::Value>;

    /// Check whether `key` has been written.
    async fn contains(&self, key: &AuditKey) -> StorageResult<bool>;
}
