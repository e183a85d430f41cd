//! In-memory record store
//!
//! `MemoryRecordStore` satisfies the `RecordStore` contract without any
//! external dependencies. Used by tests and by deployments that do not
//! need audit records to outlive the process.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

/// In-memory record store backed by a `HashMap<key, document>`.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys currently stored, in no particular order.
    pub fn keys(&self) -> Vec<AuditKey> {
        let records = self.records.lock().unwrap();
        records
            .keys()
            .filter_map(|k| AuditKey::try_from(k.clone()).ok())
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(&self, key: &AuditKey, record: serde_json::Value) -> StorageResult<()> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(key.as_str()) {
            return Err(StorageError::DuplicateKey {
                key: key.to_string(),
            });
        }
        records.insert(key.as_str().to_string(), record);
        Ok(())
    }

    async fn get(&self, key: &AuditKey) -> StorageResult<serde_json::Value> {
        let records = self.records.lock().unwrap();
        records
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }

    async fn contains(&self, key: &AuditKey) -> StorageResult<bool> {
        let records = self.records.lock().unwrap();
        Ok(records.contains_key(key.as_str()))
    }
}
