// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::testkit::unwired_orchestrator;
use drillctl_core::{FakeClock, RunId};

fn config(extra_stages: &str) -> drillctl_config::RunConfig {
    let bytes = format!(
        r#"{{
            "scenario_id": "smoke",
            "target": {{ "url": "http://localhost:9000", "transport": "http" }},
            "stages": [
                {{ "stage_id": "pre-1", "stage": "preflight", "duration_ms": 1000, "load": {{ "target_vus": 1 }} }}
                {extra_stages}
            ]
        }}"#
    );
    drillctl_config::project(bytes.as_bytes()).unwrap()
}

/// Creates a run and walks its state machine through `path` in order,
/// since `RunRecord::transition` only admits the edges in §4.1's table.
async fn run_in_state(orch: &Orchestrator<FakeClock>, path: &[RunState], config_bytes: &[u8]) -> RunId {
    let run_id = orch.create_run(config_bytes.to_vec(), "alice").await.unwrap();
    for state in path {
        orch.runs.with_run_mut(run_id.as_str(), |r| r.transition(*state, 0)).unwrap();
    }
    run_id
}

#[tokio::test]
async fn transition_to_baseline_advances_through_preflight_passed_to_baseline_running() {
    let orch = unwired_orchestrator();
    let cfg = config(r#", { "stage_id": "base-1", "stage": "baseline", "duration_ms": 1000, "load": { "target_vus": 2 } }"#);
    let run_id = run_in_state(&orch, &[RunState::PreflightRunning], serde_json::to_string(&cfg).unwrap().as_bytes()).await;

    orch.transition_to_baseline(run_id.as_str(), &cfg).await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::BaselineRunning);
    assert_eq!(record.active_stage.unwrap().stage, "baseline");

    let events = orch.tail_events(run_id.as_str(), 0, 100).unwrap();
    let to_states: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == EventType::StateTransition)
        .map(|e| e.payload["to_state"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(to_states, vec!["preflight_passed", "baseline_running"]);
}

#[tokio::test]
async fn transition_to_baseline_stops_immediately_when_no_baseline_stage_is_configured() {
    let orch = unwired_orchestrator();
    let cfg = config("");
    let run_id = run_in_state(&orch, &[RunState::PreflightRunning], serde_json::to_string(&cfg).unwrap().as_bytes()).await;

    orch.transition_to_baseline(run_id.as_str(), &cfg).await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);
    let reason = record.stop_reason.unwrap();
    assert_eq!(reason.reason, "no_enabled_baseline_stage");
    assert_eq!(reason.mode, drillctl_core::StopMode::Immediate);
}

#[tokio::test]
async fn transition_to_ramp_advances_to_ramp_running() {
    let orch = unwired_orchestrator();
    let cfg = config(r#", { "stage_id": "ramp-1", "stage": "ramp", "duration_ms": 1000, "load": { "target_vus": 4 } }"#);
    let run_id = run_in_state(&orch, &[RunState::PreflightRunning, RunState::PreflightPassed, RunState::BaselineRunning], serde_json::to_string(&cfg).unwrap().as_bytes()).await;

    orch.transition_to_ramp(run_id.as_str(), &cfg).await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::RampRunning);
    assert_eq!(record.active_stage.unwrap().stage, "ramp");
}

#[tokio::test]
async fn transition_to_ramp_stops_when_no_ramp_stage_is_configured() {
    let orch = unwired_orchestrator();
    let cfg = config("");
    let run_id = run_in_state(&orch, &[RunState::PreflightRunning, RunState::PreflightPassed, RunState::BaselineRunning], serde_json::to_string(&cfg).unwrap().as_bytes()).await;

    orch.transition_to_ramp(run_id.as_str(), &cfg).await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);
    assert_eq!(record.stop_reason.unwrap().reason, "no_enabled_ramp_stage");
}

#[tokio::test]
async fn transition_to_soak_advances_to_soak_running() {
    let orch = unwired_orchestrator();
    let cfg = config(r#", { "stage_id": "soak-1", "stage": "soak", "duration_ms": 1000, "load": { "target_vus": 4 } }"#);
    let run_id = run_in_state(&orch, &[RunState::PreflightRunning, RunState::PreflightPassed, RunState::BaselineRunning, RunState::RampRunning], serde_json::to_string(&cfg).unwrap().as_bytes()).await;

    orch.transition_to_soak(run_id.as_str(), &cfg).await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::SoakRunning);
}

#[tokio::test]
async fn transition_to_soak_requests_a_drain_stop_attributed_to_autoramp_when_no_soak_stage_is_configured() {
    let orch = unwired_orchestrator();
    let cfg = config("");
    let run_id = run_in_state(&orch, &[RunState::PreflightRunning, RunState::PreflightPassed, RunState::BaselineRunning, RunState::RampRunning], serde_json::to_string(&cfg).unwrap().as_bytes()).await;

    orch.transition_to_soak(run_id.as_str(), &cfg).await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);
    let reason = record.stop_reason.unwrap();
    assert_eq!(reason.reason, "stage_progression_complete");
    assert_eq!(reason.mode, drillctl_core::StopMode::Drain);
    assert_eq!(reason.actor, "autoramp");
}

#[tokio::test]
async fn transition_to_analyzing_requires_stopping_state() {
    let orch = unwired_orchestrator();
    let cfg = config("");
    let run_id = run_in_state(&orch, &[RunState::PreflightRunning, RunState::Stopping], serde_json::to_string(&cfg).unwrap().as_bytes()).await;

    let execution_id = orch.transition_to_analyzing(run_id.as_str()).unwrap();
    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Analyzing);
    assert_eq!(execution_id, record.execution_id.as_str());
}

#[tokio::test]
async fn transition_to_analyzing_rejects_a_non_stopping_run() {
    let orch = unwired_orchestrator();
    let cfg = config("");
    let run_id = run_in_state(&orch, &[RunState::PreflightRunning, RunState::PreflightPassed, RunState::BaselineRunning], serde_json::to_string(&cfg).unwrap().as_bytes()).await;

    assert!(matches!(orch.transition_to_analyzing(run_id.as_str()), Err(Error::InvalidState(_))));
}
