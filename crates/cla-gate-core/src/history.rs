//! Links back to this service and third-party status history.

use cla_gate_forge::StatusRecord;
use cla_gate_state::AuditKey;

/// URLs derived from this service's public webhook URL.
///
/// The webhook URL's parent path (last segment removed) is both the prefix
/// that identifies statuses this service reported and the base of the
/// details links it hands out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLinks {
    base: String,
    details_path: String,
}

impl ServiceLinks {
    pub fn new(webhook_service_url: &str, details_path: &str) -> Self {
        let base = match webhook_service_url.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => webhook_service_url.to_string(),
        };
        Self {
            base,
            details_path: details_path.trim_start_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Link to the stored audit record.
    pub fn details_url(&self, key: &AuditKey) -> String {
        format!("{}/{}{}", self.base, self.details_path, key)
    }

    /// Whether a status target URL points back at this service (case-insensitive prefix).
    pub fn is_self_originated(&self, target_url: &str) -> bool {
        target_url
            .to_lowercase()
            .starts_with(&self.base.to_lowercase())
    }

    /// Keep only statuses reported by someone else.
    ///
    /// A record without a target URL cannot be ours and is kept.
    pub fn third_party(&self, statuses: Vec<StatusRecord>) -> Vec<StatusRecord> {
        statuses
            .into_iter()
            .filter(|s| match &s.target_url {
                Some(url) => !self.is_self_originated(url),
                None => true,
            })
            .collect()
    }
}

/// Human-readable appendix listing third-party statuses, or `""` if none.
pub fn render_history_appendix(history: &[StatusRecord]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let items: Vec<String> = history
        .iter()
        .map(|item| {
            format!(
                "Description: {}\nState: {}\nDate: {}\nDetails: {}\n",
                item.description.as_deref().unwrap_or(""),
                item.state,
                item.created_at,
                item.target_url.as_deref().unwrap_or("")
            )
        })
        .collect();

    format!(
        "\n\nExternal Service Status history: \n{}",
        items.join("\n")
    )
}
