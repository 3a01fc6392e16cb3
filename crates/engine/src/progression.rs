// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage progression + auto-ramp (C8): the serial walk through
//! preflight → baseline → ramp → (soak), each stage racing its planned
//! duration against a safety timer, plus the ramp stage's stepped
//! VU increase.

use crate::orchestrator::Orchestrator;
use drillctl_config::{RunConfig, Stage};
use drillctl_core::{Actor, Clock, Evidence, EventType, StopMode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_SAFETY_MS: [(&str, u64); 4] =
    [("preflight", 600_000), ("baseline", 1_800_000), ("ramp", 7_200_000), ("soak", 86_400_000)];

fn default_safety_ms(stage_name: &str) -> u64 {
    DEFAULT_SAFETY_MS.iter().find(|(n, _)| *n == stage_name).map(|(_, ms)| *ms).unwrap_or(1_800_000)
}

impl<C: Clock + 'static> Orchestrator<C> {
    pub(crate) fn arm_progression(&self, run_id: String, config: RunConfig) {
        let cancel = self.handles_for(&run_id).progression;
        let orch = self.arc();
        tokio::spawn(async move { orch.run_progression(run_id, config, cancel).await });
    }

    async fn run_progression(&self, run_id: String, config: RunConfig, cancel: CancellationToken) {
        if !self.wait_stage(&run_id, &config, "preflight", &cancel).await {
            return;
        }
        if self.transition_to_baseline(&run_id, &config).await.is_err() {
            return;
        }

        if !self.wait_stage(&run_id, &config, "baseline", &cancel).await {
            return;
        }
        if self.transition_to_ramp(&run_id, &config).await.is_err() {
            return;
        }

        if !self.wait_stage(&run_id, &config, "ramp", &cancel).await {
            return;
        }
        if self.transition_to_soak(&run_id, &config).await.is_err() {
            return;
        }

        if config.find_stage_by_name("soak").is_some() {
            if !self.wait_stage(&run_id, &config, "soak", &cancel).await {
                return;
            }
            let _ = self
                .request_stop_with_reason(&run_id, StopMode::Drain, Actor::Autoramp, "stage_progression_complete")
                .await;
        }
    }

    /// Races a stage's planned duration against its safety timer and the
    /// progression cancellation token. Returns `true` if the planned
    /// duration won and the caller should proceed to the next transition.
    async fn wait_stage(&self, run_id: &str, config: &RunConfig, stage_name: &str, cancel: &CancellationToken) -> bool {
        let Some(stage) = config.find_stage_by_name(stage_name) else { return true };
        let safety_ms = stage.max_duration_ms.unwrap_or_else(|| default_safety_ms(stage_name));

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(Duration::from_millis(safety_ms)) => {
                self.emit_stage_timeout(run_id, stage, safety_ms);
                let _ = self.request_stop_with_reason(run_id, StopMode::Immediate, Actor::System, "stage_timeout").await;
                false
            }
            _ = tokio::time::sleep(Duration::from_millis(stage.duration_ms)) => true,
        }
    }

    fn emit_stage_timeout(&self, run_id: &str, stage: &Stage, timeout_ms: u64) {
        let Some(record) = self.runs.get_run(run_id) else { return };
        let elapsed_ms = record.active_stage.as_ref().map(|s| self.now_ms().saturating_sub(s.started_at_ms)).unwrap_or(0);
        let _ = self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                EventType::StageTimeout,
                Actor::System,
                Default::default(),
                serde_json::json!({
                    "stage": stage.stage.to_string(),
                    "stage_id": stage.stage_id,
                    "elapsed_ms": elapsed_ms,
                    "timeout_ms": timeout_ms,
                }),
                vec![Evidence::new("timeout", format!("max_duration_ms={timeout_ms}"))],
            ),
        );
    }

    /// Arms the ramp stage's stepped VU increase (§4.8, "Auto-ramp").
    pub(crate) fn arm_auto_ramp(&self, run_id: String, execution_id: String, stage: Stage, config: RunConfig) {
        let cancel = self.handles_for(&run_id).ramp;
        let orch = self.arc();
        tokio::spawn(async move { orch.run_auto_ramp(run_id, execution_id, stage, config, cancel).await });
    }

    async fn run_auto_ramp(&self, run_id: String, execution_id: String, stage: Stage, config: RunConfig, cancel: CancellationToken) {
        let max_vus = config.safety.hard_caps.max_vus.unwrap_or(u32::MAX);
        let target_vus = stage.load.target_vus.min(max_vus);
        let start_vus = stage.load.start_vus.unwrap_or_else(|| (target_vus / 10).max(1)).min(target_vus);
        let ramp_steps = stage.load.ramp_steps.unwrap_or(5).max(1);
        let step_hold_ms = stage.load.step_hold_ms.unwrap_or_else(|| stage.duration_ms / ramp_steps as u64).max(10_000);
        let vu_increment = (target_vus.saturating_sub(start_vus) / ramp_steps).max(1);

        let _ = self.append(
            &run_id,
            crate::events::decision(
                &run_id,
                &execution_id,
                Actor::Autoramp,
                "ramp_started",
                serde_json::json!({ "step": 0, "current_vus": start_vus, "target_vus": target_vus }),
            ),
        );

        let remaining_ms = |stage_started_at_ms: u64| -> u64 {
            self.now_ms().saturating_sub(stage_started_at_ms).min(stage.duration_ms).max(1_000)
        };
        let stage_started_at_ms = self.runs.get_run(&run_id).and_then(|r| r.active_stage.map(|s| s.started_at_ms)).unwrap_or_else(|| self.now_ms());

        if self.dispatch_ramp_delta(&run_id, &execution_id, &stage, &config, 0, start_vus, stage_started_at_ms, &remaining_ms).await.is_err()
        {
            return;
        }

        let mut current_vus = start_vus;
        for step in 1..=ramp_steps {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(Duration::from_millis(step_hold_ms)) => {}
            }

            match self.runs.get_run(&run_id) {
                Some(r) if r.state == drillctl_core::RunState::RampRunning => {}
                _ => return,
            }

            let next_vus = target_vus.min(start_vus + vu_increment * step);
            if next_vus > current_vus
                && self
                    .dispatch_ramp_delta(&run_id, &execution_id, &stage, &config, current_vus, next_vus, stage_started_at_ms, &remaining_ms)
                    .await
                    .is_err()
            {
                return;
            }
            current_vus = next_vus;

            let _ = self.append(
                &run_id,
                crate::events::decision(
                    &run_id,
                    &execution_id,
                    Actor::Autoramp,
                    "ramp_step",
                    serde_json::json!({ "step": step, "current_vus": current_vus, "target_vus": target_vus }),
                ),
            );

            if current_vus >= target_vus {
                break;
            }
        }

        let _ = self.append(
            &run_id,
            crate::events::decision(
                &run_id,
                &execution_id,
                Actor::Autoramp,
                "ramp_complete",
                serde_json::json!({ "current_vus": current_vus, "target_vus": target_vus }),
            ),
        );
    }

    #[allow(clippy::too_many_arguments)]
    async fn dispatch_ramp_delta(
        &self,
        run_id: &str,
        execution_id: &str,
        stage: &Stage,
        config: &RunConfig,
        from_vus: u32,
        to_vus: u32,
        stage_started_at_ms: u64,
        remaining_ms: &impl Fn(u64) -> u64,
    ) -> drillctl_core::Result<()> {
        let Some(registry) = &self.collaborators.worker_registry else { return Ok(()) };
        let delta = to_vus - from_vus;
        if delta == 0 {
            return Ok(());
        }
        let workers: Vec<drillctl_storage::allocator::WorkerCapacity> = registry
            .list_workers()
            .into_iter()
            .map(|w| drillctl_storage::allocator::WorkerCapacity { worker_id: w.worker_id, max_vus: w.capacity.max_vus })
            .collect();

        let allocation = match drillctl_storage::allocate(run_id, &stage.stage_id, delta, &workers) {
            Ok(a) => a,
            Err(err) => {
                tracing::warn!(run_id, error = %err, "ramp delta allocation failed");
                return Ok(());
            }
        };
        let shifted: std::collections::HashMap<String, drillctl_core::Assignment> = allocation
            .by_worker
            .into_iter()
            .map(|(worker_id, a)| {
                let shifted_range =
                    drillctl_core::VuidRange::new(a.vuid_range.start + from_vus, a.vuid_range.end + from_vus);
                (worker_id, drillctl_core::Assignment::new(run_id, &stage.stage_id, shifted_range))
            })
            .collect();

        self.dispatch_stage(
            run_id,
            execution_id,
            "ramp",
            &stage.stage_id,
            remaining_ms(stage_started_at_ms),
            config,
            &shifted,
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "progression_tests.rs"]
mod tests;
