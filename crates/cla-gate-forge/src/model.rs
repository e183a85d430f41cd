//! Forge-facing data shapes.
//!
//! Wire structs mirror the GitHub REST v3 JSON; the domain structs are what
//! the validation core consumes and produces.

use serde::{Deserialize, Serialize};

// ── commits ───────────────────────────────────────────────────────────────

/// Name and email recorded in a git commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

/// One commit of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    /// The `committer` recorded in the git object.
    pub committer: GitIdentity,
    /// Forge account matched to the committer. Empty when the forge could
    /// not associate the commit with any account.
    pub forge_login: String,
    pub message: String,
}

impl Commit {
    pub fn new(
        sha: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        forge_login: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sha: sha.into(),
            committer: GitIdentity {
                name: name.into(),
                email: email.into(),
            },
            forge_login: forge_login.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitEntry {
    sha: String,
    commit: GitCommitBody,
    committer: Option<AccountBody>,
}

#[derive(Debug, Deserialize)]
struct GitCommitBody {
    committer: GitIdentity,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccountBody {
    login: String,
}

impl From<CommitEntry> for Commit {
    fn from(entry: CommitEntry) -> Self {
        Commit {
            sha: entry.sha,
            committer: entry.commit.committer,
            forge_login: entry.committer.map(|a| a.login).unwrap_or_default(),
            message: entry.commit.message,
        }
    }
}

// ── statuses ──────────────────────────────────────────────────────────────

/// A commit status previously reported by anyone (this service or a third party).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub url: String,
    pub created_at: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: String,
    #[serde(default)]
    pub target_url: Option<String>,
}

/// Commit status states this service reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Success,
    Failure,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Success => "success",
            CommitState::Failure => "failure",
        }
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status update to submit for one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Statuses endpoint with `{sha}` already substituted.
    pub statuses_url: String,
    pub state: CommitState,
    /// Link shown as "Details" next to the status.
    pub details_url: String,
    pub context: String,
    /// At most 140 characters.
    pub description: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusBody<'a> {
    pub state: CommitState,
    pub target_url: &'a str,
    pub context: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a StatusReport> for StatusBody<'a> {
    fn from(report: &'a StatusReport) -> Self {
        StatusBody {
            state: report.state,
            target_url: &report.details_url,
            context: &report.context,
            description: &report.description,
        }
    }
}

/// Substitute a commit SHA into a templated statuses URL.
pub fn statuses_url_for(template: &str, sha: &str) -> String {
    template.replace("{sha}", sha)
}

// ── comments & users ──────────────────────────────────────────────────────

/// A pull request comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
}

impl Comment {
    /// Comment pointing readers at an issue tracker entry.
    pub fn issue_reference(url: &str) -> Self {
        Comment {
            body: format!("Issue tracker reference:\n{}", url),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserBody {
    #[serde(default)]
    pub email: Option<String>,
}
