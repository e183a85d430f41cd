//! Audit recording.
//!
//! One record per evaluation, written once under a fresh key and never
//! touched again. The key ends up in the status details link.

use std::sync::Arc;

use cla_gate_state::{AuditKey, RecordStore, StorageError, StorageResult};
use tracing::info;

use crate::classification::Classification;

pub struct AuditRecorder {
    store: Arc<dyn RecordStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Persist `classification` under a newly generated key.
    pub async fn record(&self, classification: &Classification) -> StorageResult<AuditKey> {
        let key = AuditKey::generate();
        let doc = serde_json::to_value(classification)?;
        self.store.put(&key, doc).await?;

        info!(
            key = %key,
            entries = classification.total_entries(),
            history = classification.status_history.len(),
            "audit record stored"
        );
        Ok(key)
    }

    /// Read a classification back, e.g. to render a details page.
    pub async fn load(&self, key: &AuditKey) -> StorageResult<Classification> {
        let doc = self.store.get(key).await?;
        serde_json::from_value(doc).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
