//! HTTP client for the CLA authority.
//!
//! The authority is queried with `GET <service_url>/<identity>` and answers
//! with a JSON string literal. See [`ClaStatus::from_response_body`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::error::ClaError;
use crate::traits::{ClaAuthority, ClaStatus};

/// CLA authority reachable over HTTP
pub struct HttpClaAuthority {
    service_url: Url,
    http_client: reqwest::Client,
}

impl HttpClaAuthority {
    /// The identity is pushed as one percent-encoded path segment onto `service_url`.
    pub fn new(service_url: &str, timeout_secs: u64) -> Result<Self, ClaError> {
        let service_url = Url::parse(service_url)
            .map_err(|e| ClaError::Config(format!("invalid CLA service URL {service_url}: {e}")))?;
        if service_url.cannot_be_a_base() {
            return Err(ClaError::Config(format!(
                "CLA service URL {service_url} cannot take a path"
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("cla-gate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClaError::Config(e.to_string()))?;

        Ok(HttpClaAuthority {
            service_url,
            http_client,
        })
    }

    fn lookup_url(&self, identity: &str) -> Url {
        let mut url = self.service_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(identity);
        }
        url
    }
}

#[async_trait]
impl ClaAuthority for HttpClaAuthority {
    async fn lookup(&self, identity: &str) -> Result<ClaStatus, ClaError> {
        let url = self.lookup_url(identity);
        debug!(url = %url, "CLA lookup");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClaError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        Ok(ClaStatus::from_response_body(&body))
    }
}
