//! CLA Gate Core Library
//!
//! Validates pull requests against the CLA and signoff policies and reports
//! one status per pull request.
//!
//! ## Key Components
//!
//! - `ValidationPipeline`: fetch, dedupe, evaluate, record, report, notify
//! - `CommitterEvaluator`: CLA lookup with login fallback, signoff matching
//! - `Classification`: the six committer buckets plus third-party history
//! - `EventDispatcher`: routes webhook events to the pipeline
//! - `ServiceConfig`: defaults, TOML and `CLA_GATE_*` environment

pub mod audit;
pub mod classification;
pub mod config;
pub mod dedup;
pub mod dispatch;
pub mod evaluator;
pub mod history;
pub mod hooks;
pub mod issue_ref;
pub mod message;
pub mod notify;
pub mod pipeline;
pub mod telemetry;
pub mod verdict;

pub use audit::AuditRecorder;
pub use classification::{Bucket, Classification};
pub use config::{ConfigError, ServiceConfig, StoreConfig};
pub use dedup::DedupFilter;
pub use dispatch::{DispatchOutcome, EventDispatcher, EventKind};
pub use evaluator::{evaluate_signoff, find_signoff, CommitterEvaluator, Signoff};
pub use history::{render_history_appendix, ServiceLinks};
pub use hooks::{HookRegistry, PullRequestHook};
pub use issue_ref::{find_issue_reference, issue_url};
pub use message::{compose, truncate_description, MessageCatalog, STATUS_DESCRIPTION_LIMIT};
pub use notify::{
    LogNotifier, MailSettings, MemoryNotifier, Notification, Notifier, NotifyError, SpoolNotifier,
};
pub use pipeline::{PipelineOutcome, Stage, StepFailure, ValidationPipeline};
pub use telemetry::init_tracing;
pub use verdict::{derive_state, Verdict};
