//! In-memory fakes for `Forge` and `ClaAuthority` (testing only)
//!
//! `MemoryForge` serves canned commits/statuses/users, records every call
//! and every posted status or comment, and can be told to fail any call.
//! `ScriptedClaAuthority` answers from a fixed identity table and records
//! the order of lookups.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ClaError, ForgeError};
use crate::model::{Comment, Commit, StatusRecord, StatusReport};
use crate::traits::{ClaAuthority, ClaStatus, Forge};
use crate::ForgeResult;

// ---------------------------------------------------------------------------
// MemoryForge
// ---------------------------------------------------------------------------

/// Forge operations, as observed by [`MemoryForge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForgeCall {
    ListCommits,
    ListStatuses,
    CreateStatus,
    CreateComment,
    UserEmail,
}

#[derive(Debug, Default)]
pub struct MemoryForge {
    commits: Mutex<Vec<Commit>>,
    statuses: Mutex<Vec<StatusRecord>>,
    emails: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<ForgeCall>>,
    calls: Mutex<Vec<ForgeCall>>,
    status_queries: Mutex<Vec<String>>,
    reports: Mutex<Vec<StatusReport>>,
    comments: Mutex<Vec<(String, Comment)>>,
}

impl MemoryForge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commits(mut self, commits: Vec<Commit>) -> Self {
        *self.commits.get_mut().unwrap() = commits;
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<StatusRecord>) -> Self {
        *self.statuses.get_mut().unwrap() = statuses;
        self
    }

    pub fn with_user_email(mut self, login: &str, email: &str) -> Self {
        self.emails
            .get_mut()
            .unwrap()
            .insert(login.to_string(), email.to_string());
        self
    }

    /// Make every invocation of `call` fail with an HTTP 500.
    pub fn failing_on(mut self, call: ForgeCall) -> Self {
        self.failing.get_mut().unwrap().insert(call);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ForgeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, call: ForgeCall) -> bool {
        self.calls.lock().unwrap().contains(&call)
    }

    /// Statuses URLs queried through `list_statuses`.
    pub fn status_queries(&self) -> Vec<String> {
        self.status_queries.lock().unwrap().clone()
    }

    /// Status reports successfully submitted.
    pub fn reports(&self) -> Vec<StatusReport> {
        self.reports.lock().unwrap().clone()
    }

    /// Comments successfully posted, with the URL they were posted to.
    pub fn comments(&self) -> Vec<(String, Comment)> {
        self.comments.lock().unwrap().clone()
    }

    fn enter(&self, call: ForgeCall, url: &str) -> ForgeResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&call) {
            return Err(ForgeError::Status {
                method: "FAKE",
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Forge for MemoryForge {
    async fn list_commits(&self, commits_url: &str) -> ForgeResult<Vec<Commit>> {
        self.enter(ForgeCall::ListCommits, commits_url)?;
        Ok(self.commits.lock().unwrap().clone())
    }

    async fn list_statuses(&self, statuses_url: &str) -> ForgeResult<Vec<StatusRecord>> {
        self.enter(ForgeCall::ListStatuses, statuses_url)?;
        self.status_queries
            .lock()
            .unwrap()
            .push(statuses_url.to_string());
        Ok(self.statuses.lock().unwrap().clone())
    }

    async fn create_status(&self, report: &StatusReport) -> ForgeResult<()> {
        self.enter(ForgeCall::CreateStatus, &report.statuses_url)?;
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }

    async fn create_comment(&self, comments_url: &str, comment: &Comment) -> ForgeResult<()> {
        self.enter(ForgeCall::CreateComment, comments_url)?;
        self.comments
            .lock()
            .unwrap()
            .push((comments_url.to_string(), comment.clone()));
        Ok(())
    }

    async fn user_email(&self, login: &str) -> ForgeResult<Option<String>> {
        self.enter(ForgeCall::UserEmail, login)?;
        Ok(self.emails.lock().unwrap().get(login).cloned())
    }
}

// ---------------------------------------------------------------------------
// ScriptedClaAuthority
// ---------------------------------------------------------------------------

/// CLA authority answering from a fixed table.
///
/// Identities not in the table answer `ClaStatus::Unknown`.
#[derive(Debug, Default)]
pub struct ScriptedClaAuthority {
    answers: HashMap<String, Option<ClaStatus>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedClaAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, identity: &str, status: ClaStatus) -> Self {
        self.answers.insert(identity.to_string(), Some(status));
        self
    }

    /// Lookups of `identity` fail with a transport error.
    pub fn unreachable_for(mut self, identity: &str) -> Self {
        self.answers.insert(identity.to_string(), None);
        self
    }

    /// Identities looked up so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClaAuthority for ScriptedClaAuthority {
    async fn lookup(&self, identity: &str) -> Result<ClaStatus, ClaError> {
        self.queries.lock().unwrap().push(identity.to_string());
        match self.answers.get(identity) {
            Some(Some(status)) => Ok(*status),
            Some(None) => Err(ClaError::Http("connection refused".to_string())),
            None => Ok(ClaStatus::Unknown),
        }
    }
}
