//! Failure notifications.
//!
//! The core only builds a [`Notification`] and hands it to a [`Notifier`].
//! Delivery is somebody else's job: [`SpoolNotifier`] drops RFC 822 style
//! files for an MTA to pick up, [`LogNotifier`] just logs.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use cla_gate_forge::{PullRequestEvent, StatusRecord};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::history::render_history_appendix;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notification rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub cc: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Addressing shared by every notification this service sends.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub from: String,
    pub admin: String,
    pub subject_prefix: String,
}

impl Notification {
    /// Validation failure mail for one pull request.
    ///
    /// `recipient` falls back to the admin address; the admin is always Cc'd.
    pub fn validation_failure(
        settings: &MailSettings,
        recipient: Option<String>,
        event: &PullRequestEvent,
        message: &str,
        history: &[StatusRecord],
    ) -> Self {
        let to = recipient
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| settings.admin.clone());

        Notification {
            to,
            cc: settings.admin.clone(),
            from: settings.from.clone(),
            subject: format!(
                "[{}][Validation Error] {}",
                settings.subject_prefix, event.repository_full_name
            ),
            body: format!(
                "There was a problem validating pull request {}\r\n\n{}{}",
                event.pull_request_url,
                message,
                render_history_appendix(history)
            ),
        }
    }

    /// RFC 822 style rendering, as written by [`SpoolNotifier`].
    pub fn to_rfc822(&self) -> String {
        format!(
            "Date: {}\r\nFrom: {}\r\nTo: {}\r\nCc: {}\r\nSubject: {}\r\n\r\n{}\r\n",
            chrono::Utc::now().to_rfc2822(),
            self.from,
            self.to,
            self.cc,
            self.subject,
            self.body
        )
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Emits notifications as log lines only.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            to = %notification.to,
            cc = %notification.cc,
            subject = %notification.subject,
            body = %notification.body,
            "notification"
        );
        Ok(())
    }
}

/// Writes one `.eml` file per notification into a spool directory.
pub struct SpoolNotifier {
    dir: PathBuf,
}

impl SpoolNotifier {
    /// Create the notifier, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, NotifyError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Notifier for SpoolNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let path = self.dir.join(format!("{}.eml", uuid::Uuid::new_v4()));

        // Atomic write: temp file in the spool directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(notification.to_rfc822().as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;

        info!(path = %path.display(), to = %notification.to, "notification spooled");
        Ok(())
    }
}

/// Keeps sent notifications in memory (testing only).
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Rejected("fake notifier configured to fail".into()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
