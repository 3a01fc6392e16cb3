// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run registry + orchestrator (C7): owns every `RunRecord` and event
//! log, and is the only component that mutates run state. A single
//! reader-writer lock (inside `RunRegistry`) serializes mutations;
//! background activities snapshot collaborators under it and release it
//! before doing I/O (§5).

use crate::cancel::RunCancelHandles;
use crate::collaborators::Collaborators;
use drillctl_core::{
    config_hash, Actor, Clock, Error, EventType, ExecutionId, Result, RunEvent, RunId, RunRecord, RunState,
};
use drillctl_storage::{EventLog, RunRegistry, DEFAULT_MAX_EVENTS};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Owns the run registry and every injected collaborator. Background
/// drivers (progression, auto-ramp, stop conditions, the finalizer) borrow
/// an `Arc<Orchestrator<C>>` so they can keep running after the call that
/// armed them returns.
///
/// Always constructed via [`Orchestrator::new`], which returns an `Arc` —
/// `self_ref` lets any `&self` method that needs to spawn a background task
/// upgrade to that same `Arc` without every call site threading one
/// through.
pub struct Orchestrator<C: Clock + 'static> {
    pub(crate) runs: Arc<RunRegistry>,
    pub(crate) collaborators: Collaborators,
    pub(crate) handles: RwLock<HashMap<String, RunCancelHandles>>,
    pub(crate) clock: C,
    self_ref: Weak<Self>,
}

impl<C: Clock + 'static> Orchestrator<C> {
    pub fn new(collaborators: Collaborators, clock: C) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            runs: Arc::new(RunRegistry::new()),
            collaborators,
            handles: RwLock::new(HashMap::new()),
            clock,
            self_ref: weak.clone(),
        })
    }

    /// Upgrades the orchestrator's own weak self-reference. Panics only if
    /// called after the last external `Arc` has been dropped, which cannot
    /// happen while a method on `&self` is executing.
    pub(crate) fn arc(&self) -> Arc<Self> {
        self.self_ref.upgrade().expect("orchestrator dropped while a method on it was executing")
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    pub(crate) fn event_log(&self, run_id: &str) -> Result<Arc<EventLog>> {
        self.runs.event_log(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))
    }

    pub(crate) fn append(&self, run_id: &str, event: RunEvent) -> Result<()> {
        self.event_log(run_id)?.append(event)
    }

    pub(crate) fn handles_for(&self, run_id: &str) -> RunCancelHandles {
        self.handles.write().entry(run_id.to_string()).or_default().clone()
    }

    pub(crate) fn replace_handles(&self, run_id: &str, handles: RunCancelHandles) {
        self.handles.write().insert(run_id.to_string(), handles);
    }

    /// Cancels progression/ramp/stop-conditions for `run_id`, in place.
    pub(crate) fn cancel_running_tasks_for(&self, run_id: &str) {
        if let Some(h) = self.handles.write().get(run_id) {
            h.cancel_running_tasks();
        }
    }

    /// Replaces the drain token with a fresh one and returns it, for a
    /// finalizer that's about to be spawned.
    pub(crate) fn rearm_drain_for(&self, run_id: &str) -> tokio_util::sync::CancellationToken {
        let mut handles = self.handles.write();
        let entry = handles.entry(run_id.to_string()).or_default();
        entry.rearm_drain();
        entry.drain.clone()
    }

    /// Cancels the current drain token without replacing it — used to wake
    /// a finalizer that's already waiting.
    pub(crate) fn cancel_drain_for(&self, run_id: &str) {
        if let Some(h) = self.handles.write().get(run_id) {
            h.drain.cancel();
        }
    }

    /// Re-projects a run's stored config bytes, per the clone/read paths
    /// that need the typed view on demand.
    pub(crate) fn project_config(&self, record: &RunRecord) -> Result<drillctl_config::RunConfig> {
        if record.config_bytes.is_empty() {
            return Err(Error::ConfigNotAvailable(record.run_id.as_str().to_string()));
        }
        drillctl_config::project(&record.config_bytes).map_err(|e| Error::internal(e.to_string()))
    }

    /// **CreateRun** (§4.7): validates, projects the config, inserts the
    /// record in `created`, and appends `RUN_CREATED`.
    pub async fn create_run(&self, config_bytes: Vec<u8>, actor: &str) -> Result<RunId> {
        if let Some(validator) = &self.collaborators.validator {
            let report = validator.validate(&config_bytes).await;
            if !report.ok {
                return Err(Error::Validation(report));
            }
        }

        let config = drillctl_config::project(&config_bytes).map_err(|e| Error::internal(e.to_string()))?;
        let hash = config_hash(&config_bytes);
        let run_id = RunId::generate();
        let execution_id = ExecutionId::generate();
        let now = self.now_ms();

        let record =
            RunRecord::new(run_id.clone(), execution_id.clone(), config.scenario_id.clone(), hash.clone(), config_bytes, now);
        self.runs.create_run(record, DEFAULT_MAX_EVENTS)?;
        self.replace_handles(run_id.as_str(), RunCancelHandles::default());

        self.append(
            run_id.as_str(),
            crate::events::build(
                run_id.as_str(),
                execution_id.as_str(),
                EventType::RunCreated,
                Actor::User,
                Default::default(),
                serde_json::json!({ "config_hash": hash, "scenario_id": config.scenario_id, "actor": actor }),
                vec![],
            ),
        )?;

        tracing::info!(run_id = %run_id, scenario_id = %config.scenario_id, "run created");
        Ok(run_id)
    }

    /// Transitions `run_id` to `failed` with a `STATE_TRANSITION` whose
    /// trigger names the failure, per §4.7's failure semantics.
    pub(crate) fn fail_run(&self, run_id: &str, trigger: &str) -> Result<()> {
        let now = self.now_ms();
        let (execution_id, from) = self.runs.with_run_mut(run_id, |r| {
            let from = r.state.to_string();
            r.transition(RunState::Failed, now)?;
            Ok((r.execution_id.as_str().to_string(), from))
        })?;
        self.append(run_id, crate::events::state_transition(run_id, &execution_id, Actor::System, &from, "failed", trigger))?;
        tracing::warn!(run_id, trigger, "run failed");
        Ok(())
    }

    // --- Read operations (§4.7) ---

    pub fn get_run(&self, run_id: &str) -> Option<RunRecord> {
        self.runs.get_run(run_id)
    }

    /// All runs, optionally filtered to those currently in `state`.
    pub fn list_runs(&self, state: Option<RunState>) -> Vec<RunRecord> {
        let runs = self.runs.list_runs();
        match state {
            Some(s) => runs.into_iter().filter(|r| r.state == s).collect(),
            None => runs,
        }
    }

    pub fn tail_events(&self, run_id: &str, cursor: i64, limit: i64) -> Result<Vec<RunEvent>> {
        self.event_log(run_id)?.tail(cursor, limit)
    }

    pub fn get_event_count(&self, run_id: &str) -> Result<usize> {
        Ok(self.event_log(run_id)?.len())
    }

    pub fn find_event_index(&self, run_id: &str, event_id: &str) -> Result<Option<usize>> {
        Ok(self.event_log(run_id)?.find_event_index(event_id))
    }

    pub fn get_run_config(&self, run_id: &str) -> Result<drillctl_config::RunConfig> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        self.project_config(&record)
    }

    /// CloneRun: re-reads `run_id`'s config bytes and feeds them back
    /// through `create_run`, minting a fresh run/execution id.
    pub async fn clone_run(&self, run_id: &str, actor: &str) -> Result<RunId> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        if record.config_bytes.is_empty() {
            return Err(Error::ConfigNotAvailable(run_id.to_string()));
        }
        self.create_run(record.config_bytes, actor).await
    }

    /// The key an external telemetry collaborator uses to correlate a run
    /// with its server-side counterpart, per §6's `TelemetryStore` contract
    /// (`scenario_id` is the join key; `run_id` disambiguates re-runs of
    /// the same scenario).
    pub fn get_run_server_telemetry_pair_key(&self, run_id: &str) -> Result<String> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        Ok(format!("{}:{}", record.scenario_id, record.run_id))
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
