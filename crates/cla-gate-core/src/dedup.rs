//! Per-run committer deduplication by email.

use std::collections::HashSet;

/// Remembers which committer emails were already evaluated in one run.
///
/// Scoped to a single pipeline run; nothing is carried across events.
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashSet<String>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once per distinct email, recording it as seen.
    pub fn should_evaluate(&mut self, email: &str) -> bool {
        self.seen.insert(email.to_string())
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
