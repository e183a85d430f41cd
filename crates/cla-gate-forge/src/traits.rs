//! Collaborator traits the validation core depends on.
//!
//! - `Forge`: the semantic forge calls a pull request evaluation needs
//! - `ClaAuthority`: CLA status lookup by email or forge login
//!
//! Both are async and transport-agnostic. HTTP implementations live in
//! `github` and `cla`; in-memory fakes live in `fakes`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClaError;
use crate::model::{Comment, Commit, StatusRecord, StatusReport};
use crate::ForgeResult;

/// Forge operations used while validating one pull request.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Ordered commit list of a pull request.
    async fn list_commits(&self, commits_url: &str) -> ForgeResult<Vec<Commit>>;

    /// Status history of one commit. `statuses_url` is already sha-substituted.
    async fn list_statuses(&self, statuses_url: &str) -> ForgeResult<Vec<StatusRecord>>;

    /// Submit a commit status.
    async fn create_status(&self, report: &StatusReport) -> ForgeResult<()>;

    /// Post a comment on the pull request conversation.
    async fn create_comment(&self, comments_url: &str, comment: &Comment) -> ForgeResult<()>;

    /// Public email of a forge account, if the account exposes one.
    async fn user_email(&self, login: &str) -> ForgeResult<Option<String>>;
}

/// Answer from the CLA authority for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaStatus {
    /// Identity has a current agreement.
    Valid,
    /// Authority knows of no agreement for this identity.
    Invalid,
    /// Response was absent or unparseable.
    Unknown,
}

impl ClaStatus {
    /// Interpret a raw authority response body.
    ///
    /// The authority answers with a JSON string literal: `"TRUE"` or `"FALSE"`.
    /// Anything else is `Unknown`.
    pub fn from_response_body(body: &str) -> Self {
        match body.trim() {
            "\"TRUE\"" => ClaStatus::Valid,
            "\"FALSE\"" => ClaStatus::Invalid,
            _ => ClaStatus::Unknown,
        }
    }
}

/// External CLA authority.
#[async_trait]
pub trait ClaAuthority: Send + Sync {
    /// Look up the agreement status of an email address or forge login.
    async fn lookup(&self, identity: &str) -> Result<ClaStatus, ClaError>;
}
