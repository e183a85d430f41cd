//! SurrealDB-backed RecordStore implementation
//!
//! Audit documents are stored as serialized JSON text in the
//! `audit_records` table, keyed by a unique `key` column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::storage_traits::{AuditKey, RecordStore, StorageResult};

const KEY_INDEX: &str = "idx_audit_key";

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Row in the `audit_records` table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuditRow {
    /// SurrealDB record ID
    id: Option<surrealdb::sql::Thing>,
    /// Audit key (unique)
    key: String,
    /// JSON-encoded classification document
    payload: String,
    /// Write timestamp
    #[serde(with = "surreal_datetime")]
    created_at: DateTime<Utc>,
}

/// SurrealDB-backed implementation of [`RecordStore`].
pub struct SurrealRecordStore {
    db: Surreal<Any>,
}

impl SurrealRecordStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `cla_gate/main`, and initialises the table.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect("mem://").await
    }

    /// Connect to any SurrealDB endpoint (`mem://`, `surrealkv://<dir>`, `ws://...`).
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to connect to {}: {}", url, e)))?;

        db.use_ns("cla_gate").use_db("main").await?;

        init_schema(&db).await?;
        info!("SurrealRecordStore connected ({})", url);
        Ok(Self { db })
    }

    async fn fetch_row(&self, key: &AuditKey) -> StorageResult<Option<AuditRow>> {
        let key_owned = key.as_str().to_string();
        let mut res = self
            .db
            .query("SELECT * FROM audit_records WHERE key = $key")
            .bind(("key", key_owned))
            .await?;

        let rows: Vec<AuditRow> = res.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Create the row; a concurrent writer that got there first surfaces as `DuplicateKey`.
    async fn insert(&self, row: AuditRow) -> StorageResult<()> {
        let key = row.key.clone();
        let created: Result<Option<AuditRow>, surrealdb::Error> =
            self.db.create("audit_records").content(row).await;
        match created {
            Ok(_) => Ok(()),
            Err(err) if is_key_conflict(&err) => Err(StorageError::DuplicateKey { key }),
            Err(err) => Err(err.into()),
        }
    }
}

/// Whether `err` is the unique `key` index rejecting a second record.
fn is_key_conflict(err: &surrealdb::Error) -> bool {
    match err {
        surrealdb::Error::Db(surrealdb::error::Db::IndexExists { index, .. }) => index == KEY_INDEX,
        // Remote engines only hand back the rendered message.
        other => other
            .to_string()
            .contains(&format!("index `{KEY_INDEX}` already contains")),
    }
}

/// Define the `audit_records` table. Safe to call multiple times.
async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("Initializing audit_records table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS audit_records AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_audit_key ON TABLE audit_records COLUMNS key UNIQUE;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StorageError::Backend(format!("schema setup failed: {e}")))?;
    Ok(())
}

#[async_trait]
impl RecordStore for SurrealRecordStore {
    async fn put(&self, key: &AuditKey, record: serde_json::Value) -> StorageResult<()> {
        if self.fetch_row(key).await?.is_some() {
            return Err(StorageError::DuplicateKey {
                key: key.to_string(),
            });
        }

        let row = AuditRow {
            id: None,
            key: key.as_str().to_string(),
            payload: serde_json::to_string(&record)?,
            created_at: Utc::now(),
        };

        debug!(key = %key, "creating audit record");
        self.insert(row).await
    }

    async fn get(&self, key: &AuditKey) -> StorageResult<serde_json::Value> {
        let row = self
            .fetch_row(key)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })?;
        Ok(serde_json::from_str(&row.payload)?)
    }

    async fn contains(&self, key: &AuditKey) -> StorageResult<bool> {
        Ok(self.fetch_row(key).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &AuditKey) -> AuditRow {
        AuditRow {
            id: None,
            key: key.as_str().to_string(),
            payload: "{}".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn index_conflict_is_a_duplicate_key() {
        let store = SurrealRecordStore::in_memory().await.unwrap();
        let key = AuditKey::generate();

        store.insert(row(&key)).await.unwrap();
        let err = store.insert(row(&key)).await.unwrap_err();
        assert!(
            matches!(&err, StorageError::DuplicateKey { key: k } if k == key.as_str()),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn concurrent_puts_keep_one_record() {
        let store = SurrealRecordStore::in_memory().await.unwrap();
        let key = AuditKey::generate();

        let (a, b) = tokio::join!(
            store.put(&key, serde_json::json!({ "writer": "a" })),
            store.put(&key, serde_json::json!({ "writer": "b" })),
        );
        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(StorageError::DuplicateKey { .. }))));
    }
}
