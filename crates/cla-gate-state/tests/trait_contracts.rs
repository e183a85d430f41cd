//! Trait contract tests for RecordStore.
//!
//! Every backend must satisfy the same put-once / get-by-key behavior.
//! The in-memory fake, the filesystem store and the SurrealDB store are all
//! run through the same checks.

use cla_gate_state::{
    AuditKey, FsRecordStore, MemoryRecordStore, RecordStore, StorageError, SurrealRecordStore,
};
use serde_json::json;

fn sample_record() -> serde_json::Value {
    json!({
        "validCLA": ["jane@x.com"],
        "invalidCLA": [],
        "unknownCLA": [],
        "validSignedOff": ["jane@x.com"],
        "invalidSignedOff": [],
        "unknownSignedOff": [],
        "StatusHistory": [{
            "url": "https://api.github.com/repos/o/r/statuses/abc",
            "created_at": "2024-01-01T00:00:00Z",
            "description": "Build passed",
            "state": "success",
            "target_url": "https://ci.example.com/build/1"
        }]
    })
}

async fn assert_roundtrip(store: &dyn RecordStore) {
    let key = AuditKey::generate();
    store.put(&key, sample_record()).await.unwrap();

    assert!(store.contains(&key).await.unwrap());
    assert_eq!(store.get(&key).await.unwrap(), sample_record());
}

async fn assert_put_once(store: &dyn RecordStore) {
    let key = AuditKey::generate();
    store.put(&key, json!({ "first": true })).await.unwrap();

    let err = store.put(&key, json!({ "first": false })).await.unwrap_err();
    assert!(matches!(err, StorageError::DuplicateKey { .. }));
    assert_eq!(store.get(&key).await.unwrap(), json!({ "first": true }));
}

async fn assert_not_found(store: &dyn RecordStore) {
    let key = AuditKey::generate();
    assert!(!store.contains(&key).await.unwrap());

    let err = store.get(&key).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

async fn assert_keys_independent(store: &dyn RecordStore) {
    let a = AuditKey::generate();
    let b = AuditKey::generate();
    store.put(&a, json!({ "which": "a" })).await.unwrap();
    store.put(&b, json!({ "which": "b" })).await.unwrap();

    assert_eq!(store.get(&a).await.unwrap()["which"], "a");
    assert_eq!(store.get(&b).await.unwrap()["which"], "b");
}

// ===========================================================================
// MemoryRecordStore
// ===========================================================================

#[tokio::test]
async fn memory_roundtrip() {
    assert_roundtrip(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn memory_put_once() {
    assert_put_once(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn memory_not_found() {
    assert_not_found(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn memory_keys_independent() {
    let store = MemoryRecordStore::new();
    assert_keys_independent(&store).await;
    assert_eq!(store.len(), 2);
}

// ===========================================================================
// FsRecordStore
// ===========================================================================

#[tokio::test]
async fn fs_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsRecordStore::new(dir.path()).unwrap();

    assert_roundtrip(&store).await;
    assert_put_once(&store).await;
    assert_not_found(&store).await;
    assert_keys_independent(&store).await;
}

#[tokio::test]
async fn fs_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let key = AuditKey::generate();
    {
        let store = FsRecordStore::new(dir.path()).unwrap();
        store.put(&key, sample_record()).await.unwrap();
    }

    let reopened = FsRecordStore::new(dir.path()).unwrap();
    assert_eq!(reopened.get(&key).await.unwrap(), sample_record());
}

// ===========================================================================
// SurrealRecordStore
// ===========================================================================

#[tokio::test]
async fn surreal_contract() {
    let store = SurrealRecordStore::in_memory().await.unwrap();

    assert_roundtrip(&store).await;
    assert_put_once(&store).await;
    assert_not_found(&store).await;
    assert_keys_independent(&store).await;
}
