// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four named stage transitions (§4.7): Preflight→Baseline,
//! Baseline→Ramp, Ramp→Soak, and (in `finalize.rs`) Stopping→Analyzing.
//! Each checks the current state, updates `active_stage`, emits
//! `STATE_TRANSITION`, and — if the scheduler is wired — dispatches the new
//! stage's assignments.

use crate::orchestrator::Orchestrator;
use drillctl_config::RunConfig;
use drillctl_core::{Actor, ActiveStage, Clock, Error, Result, RunState};
use drillctl_storage::allocator::WorkerCapacity;

impl<C: Clock + 'static> Orchestrator<C> {
    /// Full-stage allocation + dispatch: partitions `target_vus` across
    /// every registered worker and pushes a `WorkerAssignment` to each.
    /// A no-op when the scheduler trio isn't wired.
    pub(crate) async fn allocate_and_dispatch(
        &self,
        run_id: &str,
        execution_id: &str,
        stage: &str,
        stage_id: &str,
        duration_ms: u64,
        target_vus: u32,
        config: &RunConfig,
    ) -> Result<()> {
        let Some(registry) = &self.collaborators.worker_registry else { return Ok(()) };
        let workers: Vec<WorkerCapacity> = registry
            .list_workers()
            .into_iter()
            .map(|w| WorkerCapacity { worker_id: w.worker_id, max_vus: w.capacity.max_vus })
            .collect();

        match drillctl_storage::allocate(run_id, stage_id, target_vus, &workers) {
            Ok(allocation) => {
                self.dispatch_stage(run_id, execution_id, stage, stage_id, duration_ms, config, &allocation.by_worker)
                    .await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(run_id, stage, error = %err, "stage allocation failed");
                self.append(
                    run_id,
                    crate::events::build(
                        run_id,
                        execution_id,
                        drillctl_core::EventType::AllocationFailed,
                        Actor::Scheduler,
                        Default::default(),
                        serde_json::json!({ "stage": stage, "stage_id": stage_id, "target_vus": target_vus, "reason": err.to_string() }),
                        vec![],
                    ),
                )
            }
        }
    }

    fn require_state(&self, run_id: &str, expected: RunState) -> Result<(String, String)> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        if record.state != expected {
            return Err(Error::InvalidState(format!(
                "stage transition requires {}, got {}",
                expected, record.state
            )));
        }
        Ok((record.execution_id.as_str().to_string(), record.state.to_string()))
    }

    /// `preflight_running` → `preflight_passed` → `baseline_running` (§9 open
    /// question ii: preflight has no telemetry-gated evaluation, so it
    /// always passes).
    pub async fn transition_to_baseline(&self, run_id: &str, config: &RunConfig) -> Result<()> {
        let (execution_id, from) = self.require_state(run_id, RunState::PreflightRunning)?;
        let now = self.now_ms();
        self.runs.with_run_mut(run_id, |r| r.transition(RunState::PreflightPassed, now))?;
        self.append(
            run_id,
            crate::events::state_transition(run_id, &execution_id, Actor::System, &from, "preflight_passed", "preflight_complete"),
        )?;

        let Some(stage) = config.find_stage_by_name("baseline") else {
            self.request_stop_with_reason(run_id, drillctl_core::StopMode::Immediate, Actor::System, "no_enabled_baseline_stage")
                .await?;
            return Ok(());
        };
        let (stage_id, duration_ms, target_vus) = (stage.stage_id.clone(), stage.duration_ms, stage.load.target_vus);

        let now = self.now_ms();
        self.runs.with_run_mut(run_id, |r| {
            r.transition(RunState::BaselineRunning, now)?;
            r.active_stage = Some(ActiveStage { stage: "baseline".to_string(), stage_id: stage_id.clone(), started_at_ms: now });
            Ok(())
        })?;
        self.append(
            run_id,
            crate::events::state_transition(run_id, &execution_id, Actor::System, "preflight_passed", "baseline_running", "preflight_complete"),
        )?;

        self.allocate_and_dispatch(run_id, &execution_id, "baseline", &stage_id, duration_ms, target_vus, config).await?;
        self.arm_stop_conditions(run_id.to_string(), stage.clone());
        Ok(())
    }

    /// `baseline_running` → `ramp_running`; launches the auto-ramp driver
    /// instead of a one-shot full dispatch (§4.8).
    pub async fn transition_to_ramp(&self, run_id: &str, config: &RunConfig) -> Result<()> {
        let (execution_id, from) = self.require_state(run_id, RunState::BaselineRunning)?;

        let Some(stage) = config.find_stage_by_name("ramp") else {
            self.request_stop_with_reason(run_id, drillctl_core::StopMode::Immediate, Actor::System, "no_enabled_ramp_stage")
                .await?;
            return Ok(());
        };
        let stage_id = stage.stage_id.clone();

        let now = self.now_ms();
        self.runs.with_run_mut(run_id, |r| {
            r.transition(RunState::RampRunning, now)?;
            r.active_stage = Some(ActiveStage { stage: "ramp".to_string(), stage_id: stage_id.clone(), started_at_ms: now });
            Ok(())
        })?;
        self.append(run_id, crate::events::state_transition(run_id, &execution_id, Actor::System, &from, "ramp_running", "baseline_complete"))?;

        self.arm_stop_conditions(run_id.to_string(), stage.clone());
        self.arm_auto_ramp(run_id.to_string(), execution_id, stage.clone(), config.clone());
        Ok(())
    }

    /// `ramp_running` → `soak_running`.
    pub async fn transition_to_soak(&self, run_id: &str, config: &RunConfig) -> Result<()> {
        let (execution_id, from) = self.require_state(run_id, RunState::RampRunning)?;

        let Some(stage) = config.find_stage_by_name("soak") else {
            self.request_stop_with_reason(run_id, drillctl_core::StopMode::Drain, Actor::Autoramp, "stage_progression_complete").await?;
            return Ok(());
        };
        let (stage_id, duration_ms, target_vus) = (stage.stage_id.clone(), stage.duration_ms, stage.load.target_vus);

        let now = self.now_ms();
        self.runs.with_run_mut(run_id, |r| {
            r.transition(RunState::SoakRunning, now)?;
            r.active_stage = Some(ActiveStage { stage: "soak".to_string(), stage_id: stage_id.clone(), started_at_ms: now });
            Ok(())
        })?;
        self.append(run_id, crate::events::state_transition(run_id, &execution_id, Actor::System, &from, "soak_running", "ramp_complete"))?;

        self.allocate_and_dispatch(run_id, &execution_id, "soak", &stage_id, duration_ms, target_vus, config).await?;
        self.arm_stop_conditions(run_id.to_string(), stage.clone());
        Ok(())
    }

    /// `stopping` → `analyzing`, invoked by the finalizer once the drain
    /// wait is over and an analysis collaborator is actually wired.
    pub(crate) fn transition_to_analyzing(&self, run_id: &str) -> Result<String> {
        let (execution_id, from) = self.require_state(run_id, RunState::Stopping)?;
        let now = self.now_ms();
        self.runs.with_run_mut(run_id, |r| r.transition(RunState::Analyzing, now))?;
        self.append(run_id, crate::events::state_transition(run_id, &execution_id, Actor::System, &from, "analyzing", "drain_complete"))?;
        Ok(execution_id)
    }
}

#[cfg(test)]
#[path = "stage_transitions_tests.rs"]
mod tests;
