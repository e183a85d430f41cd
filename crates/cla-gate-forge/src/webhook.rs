//! Webhook payload parsing.
//!
//! GitHub delivers nested JSON; the validation core works with the flat
//! [`PullRequestEvent`] and [`StatusEvent`] shapes below.

use serde::{Deserialize, Deserializer};

use crate::error::ForgeError;
use crate::ForgeResult;

/// Action carried by a `pull_request` event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PullRequestAction {
    Opened,
    Closed,
    Reopened,
    Synchronize,
    Edited,
    Other(String),
}

impl PullRequestAction {
    pub fn as_str(&self) -> &str {
        match self {
            PullRequestAction::Opened => "opened",
            PullRequestAction::Closed => "closed",
            PullRequestAction::Reopened => "reopened",
            PullRequestAction::Synchronize => "synchronize",
            PullRequestAction::Edited => "edited",
            PullRequestAction::Other(s) => s,
        }
    }
}

impl From<&str> for PullRequestAction {
    fn from(s: &str) -> Self {
        match s {
            "opened" => PullRequestAction::Opened,
            "closed" => PullRequestAction::Closed,
            "reopened" => PullRequestAction::Reopened,
            "synchronize" => PullRequestAction::Synchronize,
            "edited" => PullRequestAction::Edited,
            other => PullRequestAction::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pull request event, flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub action: PullRequestAction,
    pub number: u64,
    pub repository_full_name: String,
    /// API URL of the pull request.
    pub pull_request_url: String,
    /// Browser URL of the pull request.
    pub html_url: String,
    pub commits_url: String,
    /// Statuses endpoint, templated with `{sha}`.
    pub statuses_url: String,
    pub comments_url: String,
    pub title: String,
    pub sender_login: String,
    pub organization: Option<String>,
}

impl PullRequestEvent {
    /// Parse a raw `pull_request` webhook body.
    pub fn from_json(payload: &[u8]) -> ForgeResult<Self> {
        let wire: PullRequestPayload = serde_json::from_slice(payload)
            .map_err(|e| ForgeError::InvalidPayload(e.to_string()))?;
        Ok(wire.into())
    }

    /// Transaction label used in every log line of one evaluation.
    pub fn transaction_id(&self) -> String {
        format!(
            "PULL REQUEST:{}:{}",
            self.repository_full_name, self.number
        )
    }
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    action: String,
    number: u64,
    pull_request: PullRequestBody,
    repository: RepositoryBody,
    sender: SenderBody,
}

#[derive(Debug, Deserialize)]
struct PullRequestBody {
    url: String,
    #[serde(default)]
    html_url: String,
    comments_url: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryBody {
    full_name: String,
    statuses_url: String,
    #[serde(default, deserialize_with = "string_or_none")]
    organization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SenderBody {
    login: String,
}

impl From<PullRequestPayload> for PullRequestEvent {
    fn from(p: PullRequestPayload) -> Self {
        PullRequestEvent {
            action: PullRequestAction::from(p.action.as_str()),
            number: p.number,
            repository_full_name: p.repository.full_name,
            commits_url: format!("{}/commits", p.pull_request.url),
            pull_request_url: p.pull_request.url,
            html_url: p.pull_request.html_url,
            statuses_url: p.repository.statuses_url,
            comments_url: p.pull_request.comments_url,
            title: p.pull_request.title,
            sender_login: p.sender.login,
            organization: p.repository.organization.filter(|o| !o.is_empty()),
        }
    }
}

/// Accept a plain string; anything else (object, null, number) becomes `None`.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// A `status` event: someone reported a commit status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusEvent {
    pub sha: String,
    pub state: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl StatusEvent {
    pub fn from_json(payload: &[u8]) -> ForgeResult<Self> {
        serde_json::from_slice(payload).map_err(|e| ForgeError::InvalidPayload(e.to_string()))
    }
}
