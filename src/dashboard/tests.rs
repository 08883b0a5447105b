use serde_json::{Value, json};
use tokio::time::{Duration, sleep};

use crate::api::{MockReply, MockSource};
use crate::app_context::AppContext;
use crate::config::{Config, DisplayTimezone, RuntimeConfig, UpdatePolicy};

use super::cycle::{FetchOutcome, Resource, ResourceError, fetch_cycle};
use super::{CaptureSink, DisplayState, mount, poll_once};

fn anomalies_body() -> Value {
    json!([
        {"service": "api", "type": "latency", "timestamp": "2024-01-01T00:00:00Z"},
        {"service": "database", "type": "error_rate", "timestamp": "2024-01-01T00:05:00Z"}
    ])
}

fn scaling_body() -> Value {
    json!({
        "api": {"current_instances": 3, "min_instances": 1, "max_instances": 5},
        "database": {"current_instances": 1, "min_instances": 1, "max_instances": 3}
    })
}

fn remediation_body() -> Value {
    json!([
        {"action": "Scale up web-server", "status": "success", "timestamp": "2025-04-16T10:01:00Z"}
    ])
}

fn llm_body() -> Value {
    json!([
        {"query": "Why is api slow?", "response": "Add an index.", "timestamp": "2025-04-16T10:02:00Z"}
    ])
}

fn healthy_backend() -> MockSource {
    let source = MockSource::new();
    source.reply("/api/anomalies", MockReply::Json(anomalies_body()));
    source.reply("/api/scaling", MockReply::Json(scaling_body()));
    source.reply("/api/remediation", MockReply::Json(remediation_body()));
    source.reply("/api/llm-responses", MockReply::Json(llm_body()));
    source
}

fn expected_state() -> DisplayState {
    DisplayState {
        anomalies: serde_json::from_value(anomalies_body()).expect("anomalies"),
        scaling: serde_json::from_value(scaling_body()).expect("scaling"),
        remediation: serde_json::from_value(remediation_body()).expect("remediation"),
        llm_responses: serde_json::from_value(llm_body()).expect("llm responses"),
        ..DisplayState::default()
    }
}

fn context_with(policy: UpdatePolicy, poll_interval_secs: u64) -> AppContext {
    let mut config = Config::default();
    config.dashboard.update_policy = policy;
    config.dashboard.poll_interval_secs = poll_interval_secs;
    config.dashboard.display_timezone = DisplayTimezone::Utc;
    AppContext::new(config, "config.toml")
}

fn same_collections(left: &DisplayState, right: &DisplayState) -> bool {
    left.anomalies == right.anomalies
        && left.scaling == right.scaling
        && left.remediation == right.remediation
        && left.llm_responses == right.llm_responses
}

#[tokio::test]
async fn successful_cycle_replaces_every_collection() {
    let source = healthy_backend();
    let app = context_with(UpdatePolicy::AllOrNothing, 30);

    let summary = poll_once(&source, &app).await;

    assert_eq!(
        summary.updated,
        vec![
            Resource::Anomalies,
            Resource::Scaling,
            Resource::Remediation,
            Resource::LlmResponses
        ]
    );
    assert!(!summary.failed());
    let state = app.display_state.read().await.clone();
    assert!(same_collections(&state, &expected_state()));
    assert_eq!(state.cycles_ok, 1);
    assert!(state.last_updated_at.is_some());
    assert_eq!(
        source.calls(),
        vec![
            "/api/anomalies",
            "/api/scaling",
            "/api/remediation",
            "/api/llm-responses"
        ]
    );
}

#[tokio::test]
async fn all_or_nothing_keeps_previous_state_and_skips_remaining_fetches() {
    let source = healthy_backend();
    let app = context_with(UpdatePolicy::AllOrNothing, 30);
    poll_once(&source, &app).await;
    let before = app.display_state.read().await.clone();

    let failing = MockSource::new();
    failing.reply("/api/anomalies", MockReply::Json(json!([])));
    failing.reply(
        "/api/scaling",
        MockReply::Status(500, r#"{"message":"Internal server error"}"#.to_string()),
    );
    failing.reply("/api/remediation", MockReply::Json(json!([])));
    failing.reply("/api/llm-responses", MockReply::Json(json!([])));

    let summary = poll_once(&failing, &app).await;

    assert!(summary.updated.is_empty());
    assert_eq!(
        summary.skipped,
        vec![Resource::Remediation, Resource::LlmResponses]
    );
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].resource(), Resource::Scaling);
    assert_eq!(failing.calls(), vec!["/api/anomalies", "/api/scaling"]);

    let after = app.display_state.read().await.clone();
    assert!(same_collections(&before, &after));
    assert_eq!(after.cycles_failed, 1);
    assert_eq!(after.last_updated_at, before.last_updated_at);
}

#[tokio::test]
async fn per_resource_policy_applies_successful_fetches_only() {
    let source = healthy_backend();
    let app = context_with(UpdatePolicy::PerResource, 30);
    poll_once(&source, &app).await;

    let partial = MockSource::new();
    partial.reply("/api/anomalies", MockReply::Json(json!([])));
    partial.reply("/api/scaling", MockReply::Status(503, "unavailable".to_string()));
    partial.reply("/api/remediation", MockReply::Json(json!([])));
    partial.reply("/api/llm-responses", MockReply::Json(json!([])));

    let summary = poll_once(&partial, &app).await;

    assert_eq!(
        summary.updated,
        vec![
            Resource::Anomalies,
            Resource::Remediation,
            Resource::LlmResponses
        ]
    );
    assert!(summary.skipped.is_empty());
    assert_eq!(partial.calls().len(), 4);

    let state = app.display_state.read().await.clone();
    assert!(state.anomalies.is_empty());
    assert!(state.remediation.is_empty());
    assert!(state.llm_responses.is_empty());
    assert_eq!(state.scaling, expected_state().scaling);
}

#[tokio::test]
async fn unexpected_payload_shape_is_a_resource_failure() {
    let source = healthy_backend();
    source.reply("/api/anomalies", MockReply::Json(json!({"not": "a list"})));

    let report = fetch_cycle(&source, UpdatePolicy::AllOrNothing).await;

    assert!(matches!(
        report.anomalies,
        FetchOutcome::Failed(ResourceError::Shape {
            resource: Resource::Anomalies,
            ..
        })
    ));
    assert!(matches!(report.scaling, FetchOutcome::Skipped));
    assert!(!report.is_complete());
}

#[tokio::test(start_paused = true)]
async fn timer_fires_on_interval_and_stops_after_teardown() {
    let source = healthy_backend();
    let app = context_with(UpdatePolicy::AllOrNothing, 30);

    let handle = mount(source.clone(), app.clone(), CaptureSink::default());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(source.calls().len(), 4);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(source.calls().len(), 8);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(source.calls().len(), 12);

    handle.shutdown().await;

    sleep(Duration::from_secs(120)).await;
    assert_eq!(source.calls().len(), 12);
}

#[tokio::test(start_paused = true)]
async fn frames_are_presented_on_mount_and_after_changes_only() {
    let source = healthy_backend();
    let app = context_with(UpdatePolicy::AllOrNothing, 30);
    let sink = CaptureSink::default();

    let handle = mount(source.clone(), app.clone(), sink.clone());
    sleep(Duration::from_secs(1)).await;

    let frames = sink.frames();
    assert_eq!(frames.len(), 2);
    assert!(!frames[0].contains("Service: api"));
    assert!(frames[1].contains("Service: api\nType: latency\nTimestamp: 1/1/2024, 12:00:00 AM"));
    assert!(frames[1].contains("api: 3 instances (Min: 1, Max: 5)"));

    source.reply(
        "/api/anomalies",
        MockReply::Status(500, "boom".to_string()),
    );
    sleep(Duration::from_secs(30)).await;

    assert_eq!(sink.frames().len(), 2);
    let state = app.display_state.read().await.clone();
    assert!(same_collections(&state, &expected_state()));
    assert_eq!(state.cycles_failed, 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn teardown_drops_in_flight_cycle() {
    let source = healthy_backend();
    source.reply("/api/scaling", MockReply::Hang);
    let app = context_with(UpdatePolicy::AllOrNothing, 30);

    let handle = mount(source.clone(), app.clone(), CaptureSink::default());
    sleep(Duration::from_secs(1)).await;
    assert!(!handle.is_finished());

    handle.shutdown().await;

    assert_eq!(source.calls(), vec!["/api/anomalies", "/api/scaling"]);
    let state = app.display_state.read().await.clone();
    assert_eq!(state, DisplayState::default());
}

#[tokio::test(start_paused = true)]
async fn runtime_update_interrupts_sleep_and_applies_new_interval() {
    let source = healthy_backend();
    let app = context_with(UpdatePolicy::AllOrNothing, 30);

    let handle = mount(source.clone(), app.clone(), CaptureSink::default());
    sleep(Duration::from_secs(1)).await;
    assert_eq!(source.calls().len(), 4);

    app.update_runtime_config(RuntimeConfig {
        poll_interval_secs: 5,
        update_policy: UpdatePolicy::AllOrNothing,
        display_timezone: DisplayTimezone::Utc,
    })
    .await;

    sleep(Duration::from_secs(1)).await;
    assert_eq!(source.calls().len(), 8);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(source.calls().len(), 12);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn oversized_interval_is_clamped_and_keeps_the_loop_alive() {
    let source = healthy_backend();
    let app = context_with(UpdatePolicy::AllOrNothing, i64::MAX as u64);

    let handle = mount(source.clone(), app.clone(), CaptureSink::default());
    sleep(Duration::from_secs(1)).await;
    assert_eq!(source.calls().len(), 4);
    assert!(!handle.is_finished());

    sleep(Duration::from_secs(86_400)).await;
    assert_eq!(source.calls().len(), 8);
    assert!(!handle.is_finished());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_polling() {
    let source = healthy_backend();
    let app = context_with(UpdatePolicy::AllOrNothing, 30);

    let handle = mount(source.clone(), app, CaptureSink::default());
    sleep(Duration::from_secs(1)).await;
    drop(handle);

    sleep(Duration::from_secs(90)).await;
    assert_eq!(source.calls().len(), 4);
}
