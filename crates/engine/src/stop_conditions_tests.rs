// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{Collaborators, Orchestrator};
use drillctl_adapters::types::OperationRecord;
use drillctl_adapters::FakeTelemetryStore;
use drillctl_core::{EventType, FakeClock, RunId, RunState};
use std::sync::Arc;
use std::time::Duration;

fn op(ok: bool, latency_ms: f64) -> OperationRecord {
    OperationRecord { ts_ms: 0, operation: "call_tool".to_string(), ok, latency_ms, tags: serde_json::Value::Null }
}

#[test]
fn evaluate_metric_computes_error_rate_from_the_window() {
    let ops = vec![op(true, 1.0), op(false, 1.0), op(false, 1.0), op(true, 1.0)];
    assert_eq!(evaluate_metric("error_rate", &ops), Some(0.5));
}

#[test]
fn evaluate_metric_computes_latency_percentiles() {
    let ops: Vec<_> = (1..=100).map(|n| op(true, n as f64)).collect();
    assert_eq!(evaluate_metric("latency_p99_ms", &ops), Some(99.0));
    assert_eq!(evaluate_metric("latency_p95_ms", &ops), Some(95.0));
}

#[test]
fn evaluate_metric_returns_none_for_an_unknown_metric() {
    assert_eq!(evaluate_metric("unknown", &[op(true, 1.0)]), None);
}

#[test]
fn evaluate_metric_on_an_empty_window_is_zero() {
    assert_eq!(evaluate_metric("error_rate", &[]), Some(0.0));
}

fn stage_with_condition(extra: &str) -> (drillctl_config::RunConfig, drillctl_config::Stage) {
    let bytes = format!(
        r#"{{
            "scenario_id": "stop-cond",
            "target": {{ "url": "http://localhost:9000", "transport": "http" }},
            "stages": [
                {{
                    "stage_id": "base-1", "stage": "baseline", "duration_ms": 3600000,
                    "load": {{ "target_vus": 1 }}
                    {extra}
                }}
            ]
        }}"#
    );
    let config = drillctl_config::project(bytes.as_bytes()).unwrap();
    let stage = config.find_stage_by_name("baseline").unwrap().clone();
    (config, stage)
}

async fn orch_with_telemetry() -> (Arc<Orchestrator<FakeClock>>, Arc<FakeTelemetryStore>, RunId) {
    let telemetry = Arc::new(FakeTelemetryStore::default());
    let collaborators = Collaborators { telemetry: Some(telemetry.clone()), ..Collaborators::default() };
    let orch = Orchestrator::new(collaborators, FakeClock::new());

    let (config, _stage) = stage_with_condition("");
    let run_id = orch.create_run(serde_json::to_vec(&config).unwrap(), "alice").await.unwrap();
    orch.runs
        .with_run_mut(run_id.as_str(), |r| {
            r.transition(RunState::PreflightRunning, 0)?;
            r.transition(RunState::PreflightPassed, 0)?;
            r.transition(RunState::BaselineRunning, 0)
        })
        .unwrap();
    (orch, telemetry, run_id)
}

#[tokio::test(start_paused = true)]
async fn run_stop_conditions_fires_after_two_consecutive_breaching_polls() {
    let (orch, telemetry, run_id) = orch_with_telemetry().await;
    let (_config, stage) =
        stage_with_condition(r#", "stop_conditions": [{ "metric": "error_rate", "comparator": ">=", "threshold": 0.5, "window_ms": 3600000, "sustain_windows": 2 }]"#);

    telemetry.push_operation(op(false, 1.0));
    telemetry.push_operation(op(false, 1.0));

    let orch2 = orch.clone();
    let run_id2 = run_id.as_str().to_string();
    let cancel = tokio_util::sync::CancellationToken::new();
    let handle = tokio::spawn(async move { orch2.run_stop_conditions(run_id2, stage, cancel).await });

    for _ in 0..3 {
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
    }
    handle.await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);

    let events = orch.tail_events(run_id.as_str(), 0, 100).unwrap();
    let trigger = events.iter().find(|e| e.event_type == EventType::StopConditionTriggered).unwrap();
    assert_eq!(trigger.payload["metric"], "error_rate");
    assert_eq!(trigger.payload["observed"], 1.0);
    assert_eq!(trigger.evidence.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn run_stop_conditions_resets_the_sustain_counter_when_a_poll_does_not_breach() {
    let (orch, telemetry, run_id) = orch_with_telemetry().await;
    let (_config, stage) =
        stage_with_condition(r#", "stop_conditions": [{ "metric": "error_rate", "comparator": ">=", "threshold": 0.6, "window_ms": 3600000, "sustain_windows": 2 }]"#);

    telemetry.push_operation(op(false, 1.0));

    let orch2 = orch.clone();
    let run_id2 = run_id.as_str().to_string();
    let cancel = tokio_util::sync::CancellationToken::new();
    let cancel2 = cancel.clone();
    let handle = tokio::spawn(async move { orch2.run_stop_conditions(run_id2, stage, cancel2).await });

    tokio::time::advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;
    telemetry.push_operation(op(true, 1.0));

    tokio::time::advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;
    telemetry.push_operation(op(false, 1.0));
    telemetry.push_operation(op(false, 1.0));

    tokio::time::advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;

    cancel.cancel();
    tokio::time::advance(Duration::from_millis(1)).await;
    handle.await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::BaselineRunning);
}

#[tokio::test(start_paused = true)]
async fn run_stop_conditions_fires_immediately_on_a_streaming_stall() {
    let (orch, telemetry, run_id) = orch_with_telemetry().await;
    let (_config, stage) = stage_with_condition(
        r#", "streaming_stop_conditions": { "stream_stall_seconds": 30, "min_events_per_second": 1.0 }"#,
    );
    telemetry.set_streaming_metrics(drillctl_adapters::types::StreamingMetrics { seconds_since_last_event: 60, events_per_second: 0.0 });

    let orch2 = orch.clone();
    let run_id2 = run_id.as_str().to_string();
    let cancel = tokio_util::sync::CancellationToken::new();
    let handle = tokio::spawn(async move { orch2.run_stop_conditions(run_id2, stage, cancel).await });

    tokio::time::advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;
    handle.await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);

    let events = orch.tail_events(run_id.as_str(), 0, 100).unwrap();
    let trigger = events.iter().find(|e| e.event_type == EventType::StopConditionTriggered).unwrap();
    assert_eq!(trigger.payload["metric"], "streaming");
}
