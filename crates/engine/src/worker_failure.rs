// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-failure handler (C10): the policy dispatch invoked when the
//! heartbeat monitor reports a worker lost.

use crate::orchestrator::Orchestrator;
use drillctl_config::WorkerFailurePolicy;
use drillctl_core::{Actor, Clock, Error, Evidence, EventType, Result, RunState, StopMode};

impl<C: Clock + 'static> Orchestrator<C> {
    /// Runs for every run the worker held an active lease for, per §4.4's
    /// fan-out.
    pub async fn handle_worker_capacity_lost(&self, run_id: &str, worker_id: &str) -> Result<()> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;

        if record.state == RunState::Stopping {
            self.cancel_drain_for(run_id);
            return Ok(());
        }

        let running = matches!(
            record.state,
            RunState::PreflightRunning | RunState::BaselineRunning | RunState::RampRunning | RunState::SoakRunning
        );
        if !running {
            tracing::info!(run_id, worker_id, state = %record.state, "worker lost in non-running state, ignoring");
            return Ok(());
        }

        let policy = if record.state == RunState::PreflightRunning {
            WorkerFailurePolicy::FailFast
        } else {
            self.project_config(&record).map(|c| c.safety.worker_failure_policy).unwrap_or_default()
        };

        match policy {
            WorkerFailurePolicy::FailFast => self.fail_fast(run_id, worker_id).await,
            WorkerFailurePolicy::ReplaceIfPossible => self.replace_if_possible(run_id, worker_id, &record).await,
            WorkerFailurePolicy::BestEffort => self.best_effort(run_id, worker_id).await,
        }
    }

    async fn fail_fast(&self, run_id: &str, worker_id: &str) -> Result<()> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        self.cancel_running_tasks_for(run_id);
        let now = self.now_ms();
        let from = record.state.to_string();
        let reason = format!("worker_failure: worker {worker_id} lost");

        self.runs.with_run_mut(run_id, |r| {
            r.transition(RunState::Stopping, now)?;
            r.stop_reason = Some(drillctl_core::StopReason {
                mode: StopMode::Immediate,
                reason: reason.clone(),
                actor: "system".to_string(),
                at_ms: now,
            });
            Ok(())
        })?;

        self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                EventType::StopRequested,
                Actor::System,
                Default::default(),
                serde_json::json!({ "mode": "immediate", "reason": reason, "policy": "fail_fast" }),
                vec![Evidence::new("worker", worker_id)],
            ),
        )?;
        self.append(run_id, crate::events::state_transition(run_id, record.execution_id.as_str(), Actor::System, &from, "stopping", "worker_failure"))?;

        if let Some(telemetry) = &self.collaborators.telemetry {
            let _ = telemetry.set_run_metadata(run_id, &record.scenario_id, Some(&reason)).await;
        }

        let drain_timeout_ms = self.project_config(&record).ok().map(|c| c.safety.stop_policy.drain_timeout_ms).unwrap_or(30_000);
        let drain_token = self.rearm_drain_for(run_id);
        self.spawn_finalizer(run_id.to_string(), drain_timeout_ms, "system".to_string(), drain_token);
        Ok(())
    }

    async fn replace_if_possible(&self, run_id: &str, worker_id: &str, record: &drillctl_core::RunRecord) -> Result<()> {
        let reallocation = (|| -> std::result::Result<_, String> {
            let active_stage = record.active_stage.as_ref().ok_or("no active stage")?;
            let config = self.project_config(record).map_err(|e| e.to_string())?;
            let stage = config.find_stage_by_name(&active_stage.stage).ok_or("no matching stage in config")?;
            if stage.load.target_vus == 0 {
                return Err("target_vus is zero".to_string());
            }
            if !self.collaborators.scheduler_wired() {
                return Err("scheduler not wired".to_string());
            }
            Ok((active_stage.clone(), stage.clone(), config))
        })();

        let (active_stage, stage, config) = match reallocation {
            Ok(v) => v,
            Err(reason) => {
                self.append(
                    run_id,
                    crate::events::decision(run_id, record.execution_id.as_str(), Actor::System, "reallocation_failed", serde_json::json!({ "reason": reason })),
                )?;
                return self.fail_fast(run_id, worker_id).await;
            }
        };

        let registry = self.collaborators.worker_registry.as_ref().expect("scheduler_wired implies worker_registry");
        let workers: Vec<drillctl_storage::allocator::WorkerCapacity> = registry
            .list_workers()
            .into_iter()
            .map(|w| drillctl_storage::allocator::WorkerCapacity { worker_id: w.worker_id, max_vus: w.capacity.max_vus })
            .collect();

        let allocation = match drillctl_storage::reallocate(run_id, &active_stage.stage_id, stage.load.target_vus, &workers, &[worker_id.to_string()]) {
            Ok(a) => a,
            Err(err) => {
                self.append(
                    run_id,
                    crate::events::decision(
                        run_id,
                        record.execution_id.as_str(),
                        Actor::System,
                        "reallocation_failed",
                        serde_json::json!({ "reason": err.to_string() }),
                    ),
                )?;
                return self.fail_fast(run_id, worker_id).await;
            }
        };

        let remaining_ms = stage.duration_ms.saturating_sub(self.now_ms().saturating_sub(active_stage.started_at_ms)).max(1_000);
        let dispatched = self
            .dispatch_stage(run_id, record.execution_id.as_str(), &active_stage.stage, &active_stage.stage_id, remaining_ms, &config, &allocation.by_worker)
            .await;

        self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                EventType::WorkerReplaced,
                Actor::System,
                Default::default(),
                serde_json::json!({
                    "lost_worker": worker_id,
                    "new_assignments": dispatched,
                    "target_vus": stage.load.target_vus,
                    "stage_id": active_stage.stage_id,
                    "policy": "replace_if_possible",
                }),
                vec![Evidence::new("worker", worker_id)],
            ),
        )?;
        self.append(
            run_id,
            crate::events::decision(run_id, record.execution_id.as_str(), Actor::System, "reallocation_success", serde_json::json!({})),
        )
    }

    async fn best_effort(&self, run_id: &str, worker_id: &str) -> Result<()> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                EventType::WorkerCapacityLost,
                Actor::System,
                Default::default(),
                serde_json::json!({ "worker_id": worker_id, "action": "continue" }),
                vec![Evidence::new("worker", worker_id)],
            ),
        )?;
        self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                EventType::SystemWarning,
                Actor::System,
                Default::default(),
                serde_json::json!({ "worker_id": worker_id, "reason": "worker_capacity_lost" }),
                vec![],
            ),
        )
    }

    /// Run ids this worker holds active leases for that are currently in a
    /// running state (used by the heartbeat monitor's fan-out).
    pub fn get_runs_for_worker(&self, worker_id: &str) -> Vec<String> {
        let Some(lease_manager) = &self.collaborators.lease_manager else { return Vec::new() };
        lease_manager
            .list_worker_run_ids(worker_id)
            .into_iter()
            .filter(|run_id| {
                self.runs.get_run(run_id).is_some_and(|r| {
                    matches!(r.state, RunState::PreflightRunning | RunState::BaselineRunning | RunState::RampRunning | RunState::SoakRunning)
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "worker_failure_tests.rs"]
mod tests;
