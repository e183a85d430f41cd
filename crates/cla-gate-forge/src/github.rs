//! GitHub REST client
//!
//! Implements [`Forge`] over the GitHub v3 JSON API. Pull request, commit
//! and status URLs come straight from webhook payloads; only user lookups
//! are built from the configured endpoint.
//!
//! List endpoints are paged: the first request asks for [`PAGE_SIZE`] entries
//! and the `Link: <...>; rel="next"` header is followed until it runs out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ForgeError;
use crate::model::{Comment, Commit, CommitEntry, StatusBody, StatusRecord, StatusReport, UserBody};
use crate::traits::Forge;
use crate::ForgeResult;

/// Largest page GitHub serves for list endpoints.
pub const PAGE_SIZE: u32 = 100;

/// GitHub client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API base URL
    pub endpoint_url: String,
    /// Bearer token (optional for public repositories)
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            endpoint_url: "https://api.github.com".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    /// Create config for a specific endpoint
    pub fn new(endpoint_url: &str) -> Self {
        GitHubConfig {
            endpoint_url: endpoint_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// GitHub client
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: GitHubConfig) -> ForgeResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("cla-gate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ForgeError::Config(e.to_string()))?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Accept", "application/vnd.github+json");
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> ForgeResult<T> {
        debug!(url, "GET");
        let response = self.authorized(self.http_client.get(url)).send().await?;
        let response = check_status("GET", url, response)?;
        Ok(response.json::<T>().await?)
    }

    /// GET every page of a list endpoint and concatenate the entries in order.
    async fn get_all_pages<T: DeserializeOwned>(&self, url: &str) -> ForgeResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first_page_url(url)?);
        while let Some(page_url) = next.take() {
            debug!(url = %page_url, "GET page");
            let response = self
                .authorized(self.http_client.get(page_url.clone()))
                .send()
                .await?;
            let response = check_status("GET", page_url.as_str(), response)?;
            next = next_page_url(response.headers()).filter(|n| *n != page_url);
            let mut page: Vec<T> = response.json().await?;
            items.append(&mut page);
        }
        Ok(items)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> ForgeResult<()> {
        debug!(url, "POST");
        let response = self
            .authorized(self.http_client.post(url))
            .json(body)
            .send()
            .await?;
        check_status("POST", url, response)?;
        Ok(())
    }
}

fn check_status(method: &'static str, url: &str, response: Response) -> ForgeResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ForgeError::Status {
            method,
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Ask for the largest page size unless the caller already chose one.
fn first_page_url(url: &str) -> ForgeResult<Url> {
    let mut url =
        Url::parse(url).map_err(|e| ForgeError::Config(format!("invalid URL {url}: {e}")))?;
    if !url.query_pairs().any(|(k, _)| k == "per_page") {
        url.query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string());
    }
    Ok(url)
}

/// The `rel="next"` target of a `Link` header, if any.
fn next_page_url(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.trim().split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| matches!(p.trim(), "rel=\"next\"" | "rel=next"));
        if !is_next {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

#[async_trait]
impl Forge for GitHubClient {
    async fn list_commits(&self, commits_url: &str) -> ForgeResult<Vec<Commit>> {
        let entries: Vec<CommitEntry> = self.get_all_pages(commits_url).await?;
        Ok(entries.into_iter().map(Commit::from).collect())
    }

    async fn list_statuses(&self, statuses_url: &str) -> ForgeResult<Vec<StatusRecord>> {
        self.get_all_pages(statuses_url).await
    }

    async fn create_status(&self, report: &StatusReport) -> ForgeResult<()> {
        self.post_json(&report.statuses_url, &StatusBody::from(report))
            .await
    }

    async fn create_comment(&self, comments_url: &str, comment: &Comment) -> ForgeResult<()> {
        self.post_json(comments_url, comment).await
    }

    async fn user_email(&self, login: &str) -> ForgeResult<Option<String>> {
        let url = format!("{}/users/{}", self.config.endpoint_url, login);
        let user: UserBody = self.get_json(&url).await?;
        Ok(user.email.filter(|e| !e.is_empty()))
    }
}
