//! Post-validation hooks, registered at startup.
//!
//! A hook is looked up by `<event>_<action>`, e.g. `pull_request_opened`,
//! and runs after the pipeline has finished with the event.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cla_gate_forge::PullRequestEvent;

#[async_trait]
pub trait PullRequestHook: Send + Sync {
    async fn run(&self, event: &PullRequestEvent) -> anyhow::Result<()>;
}

#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: HashMap<String, Arc<dyn PullRequestHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook name for a pull request action. Path separators and dots are dropped.
    pub fn pull_request_key(action: &str) -> String {
        format!("pull_request_{action}")
            .chars()
            .filter(|c| !matches!(*c, '/' | '\\' | '.'))
            .collect()
    }

    /// Register `hook` under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: impl Into<String>, hook: Arc<dyn PullRequestHook>) {
        self.hooks.insert(name.into(), hook);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PullRequestHook>> {
        self.hooks.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    #[async_trait]
    impl PullRequestHook for Counting {
        async fn run(&self, _event: &PullRequestEvent) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn key_format() {
        assert_eq!(HookRegistry::pull_request_key("opened"), "pull_request_opened");
        assert_eq!(HookRegistry::pull_request_key("../x.y"), "pull_request_xy");
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = HookRegistry::new();
        assert!(registry.is_empty());

        registry.register("pull_request_opened", Arc::new(Counting(AtomicUsize::new(0))));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("pull_request_opened").is_some());
        assert!(registry.get("pull_request_closed").is_none());
    }
}
