//! Pull request validation pipeline.
//!
//! One event in, one [`PipelineOutcome`] out. Steps run strictly in order:
//!
//! ```text
//! Received -> CommitsFetched -> Evaluated -> HistoryFetched -> Recorded
//!          -> Reported -> [NotifiedOnFailure] -> [CommentedOnOpen] -> Done
//! ```
//!
//! Every external call is bounded by the configured timeout. A failed step
//! is logged and ends the run there; earlier steps are not undone.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cla_gate_forge::{
    statuses_url_for, ClaAuthority, Comment, Forge, PullRequestAction, PullRequestEvent,
    StatusReport,
};
use cla_gate_state::RecordStore;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::audit::AuditRecorder;
use crate::classification::Classification;
use crate::config::ServiceConfig;
use crate::dedup::DedupFilter;
use crate::evaluator::CommitterEvaluator;
use crate::history::ServiceLinks;
use crate::hooks::HookRegistry;
use crate::issue_ref::{find_issue_reference, issue_url};
use crate::message::{compose, truncate_description};
use crate::notify::{Notification, Notifier};
use crate::verdict::{derive_state, Verdict};

/// Steps of one pipeline run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    CommitsFetched,
    Evaluated,
    HistoryFetched,
    Recorded,
    Reported,
    NotifiedOnFailure,
    CommentedOnOpen,
    Done,
}

/// The step that could not be completed, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub stage: Stage,
    pub reason: String,
}

/// What happened to one pull request event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    pub transaction_id: String,
    /// Completed stages, in order.
    pub stages: Vec<Stage>,
    pub verdict: Option<Verdict>,
    pub halted: Option<StepFailure>,
}

impl PipelineOutcome {
    fn new(transaction_id: String) -> Self {
        Self {
            transaction_id,
            stages: vec![Stage::Received],
            verdict: None,
            halted: None,
        }
    }

    pub fn reached(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn last_stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Received)
    }

    pub fn is_complete(&self) -> bool {
        self.reached(Stage::Done)
    }

    fn halt(mut self, failure: StepFailure) -> Self {
        self.halted = Some(failure);
        self
    }
}

pub struct ValidationPipeline {
    forge: Arc<dyn Forge>,
    authority: Arc<dyn ClaAuthority>,
    recorder: AuditRecorder,
    notifier: Arc<dyn Notifier>,
    hooks: HookRegistry,
    links: ServiceLinks,
    config: ServiceConfig,
}

impl ValidationPipeline {
    pub fn new(
        forge: Arc<dyn Forge>,
        authority: Arc<dyn ClaAuthority>,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            forge,
            authority,
            recorder: AuditRecorder::new(store),
            notifier,
            hooks: HookRegistry::new(),
            links: config.links(),
            config,
        }
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn links(&self) -> &ServiceLinks {
        &self.links
    }

    /// Validate one pull request event. Never fails; see [`PipelineOutcome`].
    pub async fn run(&self, event: &PullRequestEvent) -> PipelineOutcome {
        let tx = event.transaction_id();
        info!(tx = %tx, url = %event.html_url, action = %event.action, "pull request received");

        let outcome = PipelineOutcome::new(tx.clone());
        if event.action == PullRequestAction::Closed {
            info!(tx = %tx, "closed, not evaluating");
            return outcome;
        }

        let outcome = match self.validate(event, outcome).await {
            Ok(outcome) => outcome,
            Err(outcome) => return outcome,
        };

        self.run_hook(&tx, event).await;
        outcome
    }

    /// Everything after `Received`. `Err` carries the outcome of a halted run.
    async fn validate(
        &self,
        event: &PullRequestEvent,
        mut outcome: PipelineOutcome,
    ) -> Result<PipelineOutcome, PipelineOutcome> {
        let tx = outcome.transaction_id.clone();

        let commits = match self
            .bounded(&tx, Stage::CommitsFetched, self.forge.list_commits(&event.commits_url))
            .await
        {
            Ok(commits) => commits,
            Err(failure) => return Err(outcome.halt(failure)),
        };
        info!(tx = %tx, url = %event.commits_url, count = commits.len(), "commits fetched");
        outcome.stages.push(Stage::CommitsFetched);

        let mut classification = Classification::new();
        let mut dedup = DedupFilter::new();
        let evaluator = CommitterEvaluator::new(self.authority.as_ref(), self.call_timeout());
        for commit in &commits {
            let committer = &commit.committer;
            if dedup.should_evaluate(&committer.email) {
                evaluator.evaluate(commit, &mut classification).await;
            }
            info!(
                tx = %tx,
                sha = %commit.sha,
                name = %committer.name,
                email = %committer.email,
                "listed committer in commit"
            );
            debug!(tx = %tx, sha = %commit.sha, message = %commit.message, "commit message");
        }
        outcome.stages.push(Stage::Evaluated);

        let state = derive_state(&classification);
        let message = compose(&classification, &self.config.messages);

        if let Some(last) = commits.last() {
            let statuses_url = statuses_url_for(&event.statuses_url, &last.sha);
            let history = match self
                .bounded(&tx, Stage::HistoryFetched, self.forge.list_statuses(&statuses_url))
                .await
            {
                Ok(history) => history,
                Err(failure) => return Err(outcome.halt(failure)),
            };
            classification.status_history = self.links.third_party(history);
            debug!(
                tx = %tx,
                kept = classification.status_history.len(),
                "third-party status history"
            );
            outcome.stages.push(Stage::HistoryFetched);
        } else {
            info!(tx = %tx, "no commits, skipping status history");
        }

        let audit_key = match self
            .bounded(&tx, Stage::Recorded, self.recorder.record(&classification))
            .await
        {
            Ok(key) => key,
            Err(failure) => return Err(outcome.halt(failure)),
        };
        outcome.stages.push(Stage::Recorded);

        let verdict = Verdict {
            state,
            description: truncate_description(&message),
            message,
            audit_key,
        };
        outcome.verdict = Some(verdict.clone());

        if let Some(last) = commits.last() {
            let report = StatusReport {
                statuses_url: statuses_url_for(&event.statuses_url, &last.sha),
                state: verdict.state,
                details_url: self.links.details_url(&verdict.audit_key),
                context: self.config.status_context.clone(),
                description: verdict.description.clone(),
            };
            if let Err(failure) = self
                .bounded(&tx, Stage::Reported, self.forge.create_status(&report))
                .await
            {
                return Err(outcome.halt(failure));
            }
            info!(
                tx = %tx,
                sha = %last.sha,
                state = %verdict.state,
                details = %report.details_url,
                "status reported"
            );
            outcome.stages.push(Stage::Reported);
        } else {
            info!(tx = %tx, "no commits, no status to report");
        }

        if !verdict.is_success() {
            if let Err(failure) = self
                .notify_failure(&tx, event, &verdict, &classification)
                .await
            {
                return Err(outcome.halt(failure));
            }
            outcome.stages.push(Stage::NotifiedOnFailure);
        }

        if event.action == PullRequestAction::Opened {
            match self.comment_issue_link(&tx, event).await {
                Ok(true) => outcome.stages.push(Stage::CommentedOnOpen),
                Ok(false) => {}
                Err(failure) => return Err(outcome.halt(failure)),
            }
        }

        outcome.stages.push(Stage::Done);
        info!(tx = %tx, state = %verdict.state, "pull request validated");
        Ok(outcome)
    }

    async fn notify_failure(
        &self,
        tx: &str,
        event: &PullRequestEvent,
        verdict: &Verdict,
        classification: &Classification,
    ) -> Result<(), StepFailure> {
        // A sender without a resolvable email is not fatal: the admin gets the mail.
        let lookup = self.forge.user_email(&event.sender_login);
        let recipient = match tokio::time::timeout(self.call_timeout(), lookup).await {
            Ok(Ok(email)) => email,
            Ok(Err(e)) => {
                warn!(tx = %tx, login = %event.sender_login, error = %e, "sender lookup failed");
                None
            }
            Err(_) => {
                warn!(tx = %tx, login = %event.sender_login, "sender lookup timed out");
                None
            }
        };

        let notification = Notification::validation_failure(
            &self.config.mail_settings(),
            recipient,
            event,
            &verdict.message,
            &classification.status_history,
        );
        self.bounded(tx, Stage::NotifiedOnFailure, self.notifier.send(&notification))
            .await?;
        info!(tx = %tx, to = %notification.to, "failure notification sent");
        Ok(())
    }

    /// Post the issue tracker link if the title references one. `Ok(false)` if not.
    async fn comment_issue_link(
        &self,
        tx: &str,
        event: &PullRequestEvent,
    ) -> Result<bool, StepFailure> {
        debug!(tx = %tx, title = %event.title, "looking for issue reference");
        let Some(id) = find_issue_reference(&event.title) else {
            return Ok(false);
        };

        let organization = event
            .organization
            .as_deref()
            .unwrap_or(&self.config.issue_tracker_organization);
        let url = issue_url(&self.config.issue_tracker_url_template, organization, id);
        let comment = Comment::issue_reference(&url);

        self.bounded(
            tx,
            Stage::CommentedOnOpen,
            self.forge.create_comment(&event.comments_url, &comment),
        )
        .await?;
        info!(tx = %tx, url = %url, "issue reference comment posted");
        Ok(true)
    }

    async fn run_hook(&self, tx: &str, event: &PullRequestEvent) {
        let name = HookRegistry::pull_request_key(event.action.as_str());
        let Some(hook) = self.hooks.get(&name) else {
            return;
        };

        info!(tx = %tx, hook = %name, "invoking hook");
        if let Err(e) = hook.run(event).await {
            warn!(tx = %tx, hook = %name, error = %e, "hook failed");
        }
    }

    /// Run one external call under the timeout, mapping any failure to `stage`.
    async fn bounded<T, E, F>(&self, tx: &str, stage: Stage, call: F) -> Result<T, StepFailure>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        let timeout = self.call_timeout();
        let reason = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}s", timeout.as_secs()),
        };

        error!(tx = %tx, step = ?stage, error = %reason, "step failed, halting");
        Err(StepFailure { stage, reason })
    }

    fn call_timeout(&self) -> Duration {
        self.config.call_timeout()
    }
}
