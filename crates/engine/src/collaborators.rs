// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The injected collaborators the orchestrator drives (§6), bundled so a
//! caller can wire up as few or as many as a given deployment needs.
//!
//! `worker_registry`, `lease_manager`, and `assignment_sender` are treated
//! as a single "scheduler" trio: §4.7 requires all four of {registry,
//! allocator, lease manager, assignment sender} to be wired together or
//! not at all. The allocator itself (`drillctl_storage::allocate`) is a
//! free function with no state to inject, so the trio below stands in for
//! all four — `scheduler_is_wired` is `true` only when every member is
//! present.

use drillctl_adapters::{Aggregator, ArtifactStore, AssignmentSender, Reporter, TelemetryStore, Validator};
use drillctl_storage::{LeaseManager, WorkerRegistry};
use std::sync::Arc;

/// Builds a fresh `Box<dyn Aggregator>` per analysis run — `Aggregator`
/// accumulates per-call state (`add_operation`), so it can't be shared
/// across concurrent runs the way the other collaborators are.
pub type AggregatorFactory = Arc<dyn Fn() -> Box<dyn Aggregator> + Send + Sync>;

#[derive(Default, Clone)]
pub struct Collaborators {
    pub validator: Option<Arc<dyn Validator>>,
    pub worker_registry: Option<Arc<WorkerRegistry>>,
    pub lease_manager: Option<Arc<LeaseManager>>,
    pub assignment_sender: Option<Arc<dyn AssignmentSender>>,
    pub telemetry: Option<Arc<dyn TelemetryStore>>,
    pub artifact_store: Option<Arc<dyn ArtifactStore>>,
    pub reporter: Option<Arc<dyn Reporter>>,
    pub aggregator_factory: Option<AggregatorFactory>,
}

impl Collaborators {
    /// Whether the scheduler trio (§4.7) is wired consistently: all three
    /// present, or all three absent.
    pub fn scheduler_consistent(&self) -> bool {
        let wired =
            [self.worker_registry.is_some(), self.lease_manager.is_some(), self.assignment_sender.is_some()];
        wired.iter().all(|w| *w) || wired.iter().all(|w| !w)
    }

    pub fn scheduler_wired(&self) -> bool {
        self.worker_registry.is_some() && self.lease_manager.is_some() && self.assignment_sender.is_some()
    }

    /// Whether telemetry and an artifact store are both available, per the
    /// finalizer's `no_telemetry` fallback (§4.7).
    pub fn analysis_wired(&self) -> bool {
        self.telemetry.is_some() && self.artifact_store.is_some()
    }
}

#[cfg(test)]
#[path = "collaborators_tests.rs"]
mod tests;
