use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::storage_traits::{AuditKey, RecordStore, StorageResult};

/// Filesystem-backed record store, one pretty-printed JSON file per key.
///
/// Layout: `<root>/records/<key>.json`
pub struct FsRecordStore {
    records_dir: PathBuf,
}

impl FsRecordStore {
    /// Create a new `FsRecordStore` rooted at `root`. Creates `root/records/` if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let records_dir = root.as_ref().join("records");
        fs::create_dir_all(&records_dir)?;
        Ok(Self { records_dir })
    }

    fn record_path(&self, key: &AuditKey) -> PathBuf {
        self.records_dir.join(format!("{}.json", key.as_str()))
    }
}

#[async_trait]
impl RecordStore for FsRecordStore {
    async fn put(&self, key: &AuditKey, record: serde_json::Value) -> StorageResult<()> {
        let path = self.record_path(key);
        let bytes = serde_json::to_vec_pretty(&record)?;

        // Write to a temp file in the same directory, then link it into place.
        // `persist_noclobber` refuses to replace an existing record.
        let mut tmp = NamedTempFile::new_in(&self.records_dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                StorageError::DuplicateKey {
                    key: key.to_string(),
                }
            } else {
                StorageError::Io(e.error)
            }
        })?;

        debug!(key = %key, path = ?path, "audit record written");
        Ok(())
    }

    async fn get(&self, key: &AuditKey) -> StorageResult<serde_json::Value> {
        let path = self.record_path(key);
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn contains(&self, key: &AuditKey) -> StorageResult<bool> {
        Ok(self.record_path(key).exists())
    }
}
