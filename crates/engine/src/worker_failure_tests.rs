// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::testkit::{config_bytes, fully_wired, unwired_orchestrator};
use drillctl_core::{Assignment, EventType, FakeClock, RunId, RunState, VuidRange};

async fn running_run(orch: &Orchestrator<FakeClock>, stage_name: &str) -> RunId {
    let run_id = orch.create_run(config_bytes(""), "alice").await.unwrap();
    orch.runs
        .with_run_mut(run_id.as_str(), |r| {
            r.transition(RunState::PreflightRunning, 0)?;
            if stage_name != "preflight" {
                r.transition(RunState::PreflightPassed, 0)?;
                r.transition(RunState::BaselineRunning, 0)?;
            }
            r.active_stage = Some(drillctl_core::ActiveStage {
                stage: stage_name.to_string(),
                stage_id: "pre-1".to_string(),
                started_at_ms: 0,
            });
            Ok(())
        })
        .unwrap();
    run_id
}

#[tokio::test]
async fn handle_worker_capacity_lost_on_an_unknown_run_is_not_found() {
    let orch = unwired_orchestrator();
    let err = orch.handle_worker_capacity_lost("run_does_not_exist", "wkr_1").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn handle_worker_capacity_lost_on_a_stopping_run_just_cancels_the_drain() {
    let orch = unwired_orchestrator();
    let run_id = running_run(&orch, "baseline").await;
    orch.request_stop(run_id.as_str(), drillctl_core::StopMode::Drain, "alice").await.unwrap();

    orch.handle_worker_capacity_lost(run_id.as_str(), "wkr_1").await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);
}

#[tokio::test]
async fn handle_worker_capacity_lost_on_a_non_running_run_is_a_no_op() {
    let orch = unwired_orchestrator();
    let run_id = orch.create_run(config_bytes(""), "alice").await.unwrap();

    orch.handle_worker_capacity_lost(run_id.as_str(), "wkr_1").await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Created);
}

#[tokio::test]
async fn handle_worker_capacity_lost_during_preflight_is_always_fail_fast() {
    let orch = unwired_orchestrator();
    let run_id = running_run(&orch, "preflight").await;

    orch.handle_worker_capacity_lost(run_id.as_str(), "wkr_1").await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);
    let reason = record.stop_reason.unwrap();
    assert_eq!(reason.mode, drillctl_core::StopMode::Immediate);
    assert!(reason.reason.contains("worker_failure"));

    let events = orch.tail_events(run_id.as_str(), 0, 100).unwrap();
    assert!(events.iter().any(|e| e.event_type == EventType::StopRequested && e.payload["policy"] == "fail_fast"));
}

#[tokio::test]
async fn handle_worker_capacity_lost_defaults_to_fail_fast_when_no_policy_is_configured() {
    let orch = unwired_orchestrator();
    let run_id = running_run(&orch, "baseline").await;

    orch.handle_worker_capacity_lost(run_id.as_str(), "wkr_1").await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);
    assert_eq!(record.stop_reason.unwrap().mode, drillctl_core::StopMode::Immediate);
}

#[tokio::test]
async fn replace_if_possible_falls_back_to_fail_fast_when_the_scheduler_is_not_wired() {
    let orch = unwired_orchestrator();
    let bytes = br#"{
        "scenario_id": "replace",
        "target": { "url": "http://localhost:9000", "transport": "http" },
        "safety": { "worker_failure_policy": "replace_if_possible" },
        "stages": [
            { "stage_id": "base-1", "stage": "baseline", "duration_ms": 60000, "load": { "target_vus": 4 } }
        ]
    }"#;
    let run_id = orch.create_run(bytes.to_vec(), "alice").await.unwrap();
    orch.runs
        .with_run_mut(run_id.as_str(), |r| {
            r.transition(RunState::PreflightRunning, 0)?;
            r.transition(RunState::PreflightPassed, 0)?;
            r.transition(RunState::BaselineRunning, 0)?;
            r.active_stage = Some(drillctl_core::ActiveStage { stage: "baseline".to_string(), stage_id: "base-1".to_string(), started_at_ms: 0 });
            Ok(())
        })
        .unwrap();

    orch.handle_worker_capacity_lost(run_id.as_str(), "wkr_1").await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::Stopping);
    assert_eq!(record.stop_reason.unwrap().mode, drillctl_core::StopMode::Immediate);

    let events = orch.tail_events(run_id.as_str(), 0, 100).unwrap();
    assert!(events.iter().any(|e| e.payload["kind"] == "reallocation_failed"));
}

#[tokio::test]
async fn replace_if_possible_reallocates_onto_a_surviving_worker() {
    let (collaborators, registry, lost_worker) = fully_wired();
    let surviving = registry.register("host-2", drillctl_core::Capacity { max_vus: 100, max_concurrent_ops: 100, max_rps: 1000 }, 0);
    let lease_manager = collaborators.lease_manager.clone().unwrap();

    let orch = Orchestrator::new(collaborators, FakeClock::new());
    let bytes = br#"{
        "scenario_id": "replace",
        "target": { "url": "http://localhost:9000", "transport": "http" },
        "safety": { "worker_failure_policy": "replace_if_possible" },
        "stages": [
            { "stage_id": "base-1", "stage": "baseline", "duration_ms": 60000, "load": { "target_vus": 4 } }
        ]
    }"#;
    let run_id = orch.create_run(bytes.to_vec(), "alice").await.unwrap();
    orch.runs
        .with_run_mut(run_id.as_str(), |r| {
            r.transition(RunState::PreflightRunning, 0)?;
            r.transition(RunState::PreflightPassed, 0)?;
            r.transition(RunState::BaselineRunning, 0)?;
            r.active_stage = Some(drillctl_core::ActiveStage { stage: "baseline".to_string(), stage_id: "base-1".to_string(), started_at_ms: 0 });
            Ok(())
        })
        .unwrap();

    lease_manager.issue_lease(&lost_worker, Assignment::new(run_id.as_str().to_string(), "base-1", VuidRange::new(0, 3)), 0);

    orch.handle_worker_capacity_lost(run_id.as_str(), &lost_worker).await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::BaselineRunning);

    let events = orch.tail_events(run_id.as_str(), 0, 100).unwrap();
    let replaced = events.iter().find(|e| e.event_type == EventType::WorkerReplaced).unwrap();
    assert_eq!(replaced.payload["lost_worker"], lost_worker);
    assert!(events.iter().any(|e| e.payload["kind"] == "reallocation_success"));
    let _ = surviving;
}

#[tokio::test]
async fn best_effort_emits_capacity_lost_and_a_system_warning_without_stopping() {
    let orch = unwired_orchestrator();
    let bytes = br#"{
        "scenario_id": "best-effort",
        "target": { "url": "http://localhost:9000", "transport": "http" },
        "safety": { "worker_failure_policy": "best_effort" },
        "stages": [
            { "stage_id": "base-1", "stage": "baseline", "duration_ms": 60000, "load": { "target_vus": 4 } }
        ]
    }"#;
    let run_id = orch.create_run(bytes.to_vec(), "alice").await.unwrap();
    orch.runs
        .with_run_mut(run_id.as_str(), |r| {
            r.transition(RunState::PreflightRunning, 0)?;
            r.transition(RunState::PreflightPassed, 0)?;
            r.transition(RunState::BaselineRunning, 0)
        })
        .unwrap();

    orch.handle_worker_capacity_lost(run_id.as_str(), "wkr_1").await.unwrap();

    let record = orch.get_run(run_id.as_str()).unwrap();
    assert_eq!(record.state, RunState::BaselineRunning);

    let events = orch.tail_events(run_id.as_str(), 0, 100).unwrap();
    assert!(events.iter().any(|e| e.event_type == EventType::WorkerCapacityLost));
    assert!(events.iter().any(|e| e.event_type == EventType::SystemWarning));
}

#[tokio::test]
async fn get_runs_for_worker_only_returns_runs_in_a_running_state() {
    let (collaborators, registry, worker_id) = fully_wired();
    let lease_manager = collaborators.lease_manager.clone().unwrap();
    let orch = Orchestrator::new(collaborators, FakeClock::new());

    let running = running_run(&orch, "baseline").await;
    let created = orch.create_run(config_bytes(""), "alice").await.unwrap();

    lease_manager.issue_lease(&worker_id, Assignment::new(running.as_str().to_string(), "base-1", VuidRange::new(0, 1)), 0);
    lease_manager.issue_lease(&worker_id, Assignment::new(created.as_str().to_string(), "pre-1", VuidRange::new(0, 1)), 0);

    let runs = orch.get_runs_for_worker(&worker_id);
    assert_eq!(runs, vec![running.as_str().to_string()]);
    let _ = registry;
}
