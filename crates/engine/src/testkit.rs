// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures: a minimal config builder and a `Collaborators`
//! wired entirely from `drillctl-adapters`' fakes, so every module's test
//! file can build an `Orchestrator<FakeClock>` without repeating the
//! boilerplate.

#![cfg(test)]

use crate::{Collaborators, Orchestrator};
use drillctl_core::FakeClock;
use drillctl_storage::{LeaseManager, WorkerRegistry};
use std::sync::Arc;

/// A config with one enabled preflight stage and nothing else, unless
/// `extra` supplies more stages/workload/safety fields.
pub fn config_bytes(extra: &str) -> Vec<u8> {
    format!(
        r#"{{
            "scenario_id": "smoke",
            "target": {{ "url": "http://localhost:9000", "transport": "http" }},
            "stages": [
                {{ "stage_id": "pre-1", "stage": "preflight", "duration_ms": 1000, "load": {{ "target_vus": 1 }} }}
            ]
            {extra}
        }}"#
    )
    .into_bytes()
}

/// A config carrying preflight, baseline, ramp, and soak stages, all with
/// short durations so progression tests don't block for real wall-clock
/// time beyond a handful of milliseconds.
pub fn full_progression_config_bytes() -> Vec<u8> {
    r#"{
        "scenario_id": "full",
        "target": { "url": "http://localhost:9000", "transport": "http" },
        "stages": [
            { "stage_id": "pre-1", "stage": "preflight", "duration_ms": 5, "load": { "target_vus": 1 } },
            { "stage_id": "base-1", "stage": "baseline", "duration_ms": 5, "load": { "target_vus": 2 } },
            { "stage_id": "ramp-1", "stage": "ramp", "duration_ms": 20, "load": { "target_vus": 4, "ramp_steps": 2, "step_hold_ms": 5 } },
            { "stage_id": "soak-1", "stage": "soak", "duration_ms": 5, "load": { "target_vus": 4 } }
        ]
    }"#
        .as_bytes()
        .to_vec()
}

pub fn unwired_orchestrator() -> Arc<Orchestrator<FakeClock>> {
    Orchestrator::new(Collaborators::default(), FakeClock::new())
}

/// Collaborators with the full scheduler trio plus analysis wired from
/// fakes, and one worker registered with plenty of capacity.
pub fn fully_wired() -> (Collaborators, Arc<WorkerRegistry>, String) {
    let registry = Arc::new(WorkerRegistry::new());
    let worker_id = registry.register(
        "test-host",
        drillctl_core::Capacity { max_vus: 100, max_concurrent_ops: 100, max_rps: 1000 },
        0,
    );
    let collaborators = Collaborators {
        validator: Some(Arc::new(drillctl_adapters::FakeValidator::default())),
        worker_registry: Some(registry.clone()),
        lease_manager: Some(Arc::new(LeaseManager::new())),
        assignment_sender: Some(Arc::new(drillctl_adapters::FakeAssignmentSender::default())),
        telemetry: Some(Arc::new(drillctl_adapters::FakeTelemetryStore::default())),
        artifact_store: Some(Arc::new(drillctl_adapters::FakeArtifactStore::default())),
        reporter: Some(Arc::new(drillctl_adapters::FakeReporter)),
        aggregator_factory: Some(Arc::new(|| Box::new(drillctl_adapters::FakeAggregator::default()) as Box<_>)),
    };
    (collaborators, registry, worker_id)
}

pub fn wired_orchestrator() -> (Arc<Orchestrator<FakeClock>>, String) {
    let (collaborators, _registry, worker_id) = fully_wired();
    (Orchestrator::new(collaborators, FakeClock::new()), worker_id)
}
