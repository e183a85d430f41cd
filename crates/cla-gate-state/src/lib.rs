//! CLA Gate State: audit record persistence
//!
//! Every pull request evaluation produces exactly one audit record: the full
//! committer classification plus third-party status history. The record is
//! written once under a freshly generated [`AuditKey`] and later read back
//! by whatever serves the status details link.
//!
//! ## Key Components
//!
//! - `RecordStore`: put-once / get-by-key capability all backends implement
//! - `MemoryRecordStore`: in-memory fake (tests, ephemeral deployments)
//! - `FsRecordStore`: one JSON document per key on local disk
//! - `SurrealRecordStore`: SurrealDB table with a unique key index

mod error;
pub mod fakes;
pub mod fs_store;
pub mod storage_traits;
pub mod surreal_store;

pub use error::StorageError;
pub use fakes::MemoryRecordStore;
pub use fs_store::FsRecordStore;
pub use storage_traits::{AuditKey, RecordStore, StorageResult};
pub use surreal_store::SurrealRecordStore;
