//! Webhook event routing.

use cla_gate_forge::{PullRequestEvent, StatusEvent};
use serde::Serialize;
use tracing::{info, warn};

use crate::pipeline::{PipelineOutcome, ValidationPipeline};

/// Forge event type, as named by the webhook's event header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    PullRequest,
    Status,
    Unhandled(String),
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "pull_request" => EventKind::PullRequest,
            "status" => EventKind::Status,
            other => EventKind::Unhandled(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchOutcome {
    PullRequest(PipelineOutcome),
    /// A status event was seen. Nothing is re-evaluated.
    Status { third_party: bool },
    Unhandled { event: String },
    Malformed { reason: String },
}

pub struct EventDispatcher {
    pipeline: ValidationPipeline,
}

impl EventDispatcher {
    pub fn new(pipeline: ValidationPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn dispatch(&self, kind: &EventKind, payload: &[u8]) -> DispatchOutcome {
        match kind {
            EventKind::PullRequest => match PullRequestEvent::from_json(payload) {
                Ok(event) => DispatchOutcome::PullRequest(self.pipeline.run(&event).await),
                Err(e) => malformed("pull_request", e),
            },
            EventKind::Status => match StatusEvent::from_json(payload) {
                Ok(event) => self.handle_status(&event),
                Err(e) => malformed("status", e),
            },
            EventKind::Unhandled(name) => {
                warn!(event = %name, "unhandled event kind");
                DispatchOutcome::Unhandled {
                    event: name.clone(),
                }
            }
        }
    }

    fn handle_status(&self, event: &StatusEvent) -> DispatchOutcome {
        let third_party = match &event.target_url {
            Some(url) => !self.pipeline.links().is_self_originated(url),
            None => true,
        };
        info!(
            sha = %event.sha,
            state = %event.state,
            target_url = event.target_url.as_deref().unwrap_or(""),
            third_party,
            "commit status update"
        );
        DispatchOutcome::Status { third_party }
    }
}

fn malformed(kind: &str, e: impl std::fmt::Display) -> DispatchOutcome {
    warn!(event = kind, error = %e, "malformed payload dropped");
    DispatchOutcome::Malformed {
        reason: e.to_string(),
    }
}
