//! Service configuration.
//!
//! Defaults first, then a TOML file, then `CLA_GATE_*` environment
//! variables. Missing TOML keys keep their defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cla_gate_forge::GitHubConfig;
use cla_gate_state::{
    FsRecordStore, MemoryRecordStore, RecordStore, StorageResult, SurrealRecordStore,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::ServiceLinks;
use crate::message::MessageCatalog;
use crate::notify::MailSettings;

const ENV_PREFIX: &str = "CLA_GATE_";

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override did not parse
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: String, value: String },
}

/// Where audit records go.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreConfig {
    #[default]
    Memory,
    /// One JSON file per record under this directory.
    Fs(PathBuf),
    /// SurrealDB endpoint, e.g. `ws://localhost:8000` or `surrealkv://data`.
    Surreal(String),
}

impl StoreConfig {
    /// Parse the `CLA_GATE_STORE` form: `memory`, `fs:<dir>` or `surreal:<url>`.
    pub fn parse_env(value: &str) -> Option<Self> {
        match value.split_once(':') {
            _ if value == "memory" => Some(StoreConfig::Memory),
            Some(("fs", dir)) if !dir.is_empty() => Some(StoreConfig::Fs(PathBuf::from(dir))),
            Some(("surreal", url)) if !url.is_empty() => Some(StoreConfig::Surreal(url.to_string())),
            _ => None,
        }
    }

    /// Open the configured backend.
    pub async fn open(&self) -> StorageResult<Arc<dyn RecordStore>> {
        Ok(match self {
            StoreConfig::Memory => Arc::new(MemoryRecordStore::new()),
            StoreConfig::Fs(dir) => Arc::new(FsRecordStore::new(dir)?),
            StoreConfig::Surreal(url) => Arc::new(SurrealRecordStore::connect(url).await?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// The looked-up identity is appended to this URL.
    pub cla_service_url: String,
    pub github_endpoint_url: String,
    pub github_token: Option<String>,
    /// Public URL of this service's webhook endpoint.
    pub webhook_service_url: String,
    pub details_path: String,
    pub status_context: String,
    pub admin_email: String,
    pub mail_from: String,
    pub mail_subject_prefix: String,
    /// Notifications are spooled here as `.eml` files when set, logged otherwise.
    pub mail_spool_dir: Option<PathBuf>,
    pub issue_tracker_organization: String,
    pub issue_tracker_url_template: String,
    pub call_timeout_secs: u64,
    pub messages: MessageCatalog,
    pub store: StoreConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            cla_service_url: "https://projects.eclipse.org/api/cla/validate/".to_string(),
            github_endpoint_url: "https://api.github.com".to_string(),
            github_token: None,
            webhook_service_url: "http://localhost/git-eca/webhook.php".to_string(),
            details_path: "status_details.php?id=".to_string(),
            status_context: "ip-validation".to_string(),
            admin_email: "admin@localhost".to_string(),
            mail_from: "noreply@localhost".to_string(),
            mail_subject_prefix: "Eclipse-Github".to_string(),
            mail_spool_dir: None,
            issue_tracker_organization: "eclipse".to_string(),
            issue_tracker_url_template: "https://bugs.{org}.org/bugs/show_bug.cgi?id={id}"
                .to_string(),
            call_timeout_secs: 30,
            messages: MessageCatalog::default(),
            store: StoreConfig::Memory,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|var| std::env::var(var).ok())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Override fields from `CLA_GATE_<FIELD>` variables found by `lookup`.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let var = format!("{ENV_PREFIX}{name}");
            lookup(&var).map(|value| (var, value))
        };

        let strings: [(&str, &mut String); 10] = [
            ("CLA_SERVICE_URL", &mut self.cla_service_url),
            ("GITHUB_ENDPOINT_URL", &mut self.github_endpoint_url),
            ("WEBHOOK_SERVICE_URL", &mut self.webhook_service_url),
            ("DETAILS_PATH", &mut self.details_path),
            ("STATUS_CONTEXT", &mut self.status_context),
            ("ADMIN_EMAIL", &mut self.admin_email),
            ("MAIL_FROM", &mut self.mail_from),
            ("MAIL_SUBJECT_PREFIX", &mut self.mail_subject_prefix),
            ("ISSUE_TRACKER_ORGANIZATION", &mut self.issue_tracker_organization),
            ("ISSUE_TRACKER_URL_TEMPLATE", &mut self.issue_tracker_url_template),
        ];
        for (name, field) in strings {
            if let Some((_, value)) = get(name) {
                *field = value;
            }
        }

        if let Some((_, token)) = get("GITHUB_TOKEN") {
            self.github_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some((_, dir)) = get("MAIL_SPOOL_DIR") {
            self.mail_spool_dir = Some(PathBuf::from(dir));
        }
        if let Some((var, value)) = get("CALL_TIMEOUT_SECS") {
            self.call_timeout_secs = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    var: var.clone(),
                    value: value.clone(),
                })?;
        }
        if let Some((var, value)) = get("STORE") {
            self.store =
                StoreConfig::parse_env(&value).ok_or(ConfigError::InvalidEnv { var, value })?;
        }

        Ok(self)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn links(&self) -> ServiceLinks {
        ServiceLinks::new(&self.webhook_service_url, &self.details_path)
    }

    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            from: self.mail_from.clone(),
            admin: self.admin_email.clone(),
            subject_prefix: self.mail_subject_prefix.clone(),
        }
    }

    pub fn github_config(&self) -> GitHubConfig {
        let config = GitHubConfig::new(&self.github_endpoint_url);
        let config = match &self.github_token {
            Some(token) => config.with_token(token),
            None => config,
        };
        GitHubConfig {
            timeout_secs: self.call_timeout_secs,
            ..config
        }
    }
}
