//! Webhook payloads routed through the dispatcher.

use std::sync::Arc;

use cla_gate_core::{
    DispatchOutcome, EventDispatcher, EventKind, MemoryNotifier, ServiceConfig, Stage,
    ValidationPipeline,
};
use cla_gate_forge::fakes::{ForgeCall, MemoryForge, ScriptedClaAuthority};
use cla_gate_forge::{ClaStatus, Commit};
use cla_gate_state::MemoryRecordStore;
use serde_json::json;

fn dispatcher(forge: Arc<MemoryForge>) -> EventDispatcher {
    let config = ServiceConfig {
        webhook_service_url: "https://ip.example.org/git/webhook.php".to_string(),
        ..ServiceConfig::default()
    };
    let pipeline = ValidationPipeline::new(
        forge,
        Arc::new(ScriptedClaAuthority::new().with("jane@x.com", ClaStatus::Valid)),
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryNotifier::new()),
        config,
    );
    EventDispatcher::new(pipeline)
}

fn pull_request_payload(action: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "action": action,
        "number": 3,
        "pull_request": {
            "url": "https://api.github.com/repos/acme/widget/pulls/3",
            "html_url": "https://github.com/acme/widget/pull/3",
            "comments_url": "https://api.github.com/repos/acme/widget/issues/3/comments",
            "title": "Bug 55: fix crash"
        },
        "repository": {
            "full_name": "acme/widget",
            "statuses_url": "https://api.github.com/repos/acme/widget/statuses/{sha}",
            "organization": "acme"
        },
        "sender": { "login": "janedoe" }
    }))
    .unwrap()
}

fn forge() -> Arc<MemoryForge> {
    Arc::new(MemoryForge::new().with_commits(vec![Commit::new(
        "c0ffee",
        "Jane Doe",
        "jane@x.com",
        "janedoe",
        "Fix crash\n\nSigned-off-by: Jane Doe <jane@x.com>",
    )]))
}

#[tokio::test]
async fn pull_request_payload_runs_the_pipeline() {
    let forge = forge();
    let outcome = dispatcher(forge.clone())
        .dispatch(&EventKind::from("pull_request"), &pull_request_payload("opened"))
        .await;

    let DispatchOutcome::PullRequest(run) = outcome else {
        panic!("expected a pipeline run, got {outcome:?}");
    };
    assert_eq!(run.transaction_id, "PULL REQUEST:acme/widget:3");
    assert!(run.is_complete());
    assert!(run.reached(Stage::CommentedOnOpen));

    assert_eq!(
        forge.status_queries(),
        vec!["https://api.github.com/repos/acme/widget/statuses/c0ffee".to_string()]
    );
    assert_eq!(
        forge.comments()[0].1.body,
        "Issue tracker reference:\nhttps://bugs.acme.org/bugs/show_bug.cgi?id=55"
    );
    assert!(forge.calls().contains(&ForgeCall::ListCommits));
    assert_eq!(forge.calls()[0], ForgeCall::ListCommits);
}

#[tokio::test]
async fn closed_payload_touches_nothing() {
    let forge = forge();
    let outcome = dispatcher(forge.clone())
        .dispatch(&EventKind::PullRequest, &pull_request_payload("closed"))
        .await;

    match outcome {
        DispatchOutcome::PullRequest(run) => assert_eq!(run.stages, vec![Stage::Received]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(forge.calls().is_empty());
}

#[tokio::test]
async fn status_events_are_classified_not_revalidated() {
    let forge = forge();
    let d = dispatcher(forge.clone());

    let third_party = serde_json::to_vec(&json!({
        "sha": "c0ffee",
        "state": "success",
        "description": "CI passed",
        "target_url": "https://ci.example.org/build/1",
        "context": "ci"
    }))
    .unwrap();
    assert_eq!(
        d.dispatch(&EventKind::Status, &third_party).await,
        DispatchOutcome::Status { third_party: true }
    );

    let ours = serde_json::to_vec(&json!({
        "sha": "c0ffee",
        "state": "failure",
        "target_url": "https://ip.example.org/git/status_details.php?id=abc",
        "context": "ip-validation"
    }))
    .unwrap();
    assert_eq!(
        d.dispatch(&EventKind::Status, &ours).await,
        DispatchOutcome::Status { third_party: false }
    );

    assert!(forge.calls().is_empty());
}

#[tokio::test]
async fn unknown_events_and_bad_payloads_are_dropped() {
    let forge = forge();
    let d = dispatcher(forge.clone());

    assert_eq!(
        d.dispatch(&EventKind::from("push"), b"{}").await,
        DispatchOutcome::Unhandled {
            event: "push".to_string()
        }
    );
    assert!(matches!(
        d.dispatch(&EventKind::PullRequest, b"not json").await,
        DispatchOutcome::Malformed { .. }
    ));
    assert!(matches!(
        d.dispatch(&EventKind::Status, b"{\"state\": 1}").await,
        DispatchOutcome::Malformed { .. }
    ));
    assert!(forge.calls().is_empty());
}

#[tokio::test]
async fn outcome_serializes_for_the_cli() {
    let outcome = dispatcher(forge())
        .dispatch(&EventKind::PullRequest, &pull_request_payload("synchronize"))
        .await;

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["kind"], "pull_request");
    assert_eq!(value["verdict"]["state"], "success");
    assert_eq!(value["stages"].as_array().unwrap().last().unwrap(), "done");
}
