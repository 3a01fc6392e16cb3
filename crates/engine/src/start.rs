// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StartRun` (§4.7): preflight allocation, the `created` → `preflight_running`
//! transition, and arming stage progression.

use crate::orchestrator::Orchestrator;
use drillctl_core::{Actor, Clock, Error, EventType, Result, RunState};
use drillctl_storage::allocator::WorkerCapacity;

impl<C: Clock + 'static> Orchestrator<C> {
    pub async fn start_run(&self, run_id: &str, actor: &str) -> Result<()> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        if record.state != RunState::Created {
            return Err(Error::InvalidState(format!("start_run requires created, got {}", record.state)));
        }

        let config = self.project_config(&record)?;
        let preflight = config
            .find_stage_by_name("preflight")
            .ok_or_else(|| Error::internal("no enabled preflight stage in config"))?;
        let stage_id = preflight.stage_id.clone();
        let duration_ms = preflight.duration_ms;
        let target_vus = preflight.load.target_vus;

        if !self.collaborators.scheduler_consistent() {
            self.fail_run(run_id, "scheduler_misconfiguration")?;
            return Ok(());
        }

        let allocation = if self.collaborators.scheduler_wired() {
            let workers: Vec<WorkerCapacity> = self
                .collaborators
                .worker_registry
                .as_ref()
                .expect("scheduler_wired implies worker_registry is set")
                .list_workers()
                .into_iter()
                .map(|w| WorkerCapacity { worker_id: w.worker_id, max_vus: w.capacity.max_vus })
                .collect();

            match drillctl_storage::allocate(run_id, &stage_id, target_vus, &workers) {
                Ok(result) => Some(result),
                Err(err) => {
                    tracing::warn!(run_id, error = %err, "preflight allocation failed");
                    let _ = self.append(
                        run_id,
                        crate::events::build(
                            run_id,
                            record.execution_id.as_str(),
                            EventType::AllocationFailed,
                            Actor::Scheduler,
                            Default::default(),
                            serde_json::json!({ "stage_id": stage_id, "target_vus": target_vus, "reason": err.to_string() }),
                            vec![],
                        ),
                    );
                    self.fail_run(run_id, "allocation_failed")?;
                    return Ok(());
                }
            }
        } else {
            None
        };

        let now = self.now_ms();
        self.runs.with_run_mut(run_id, |r| {
            if r.state != RunState::Created {
                return Err(Error::InvalidState(format!("start_run requires created, got {}", r.state)));
            }
            r.transition(RunState::PreflightRunning, now)?;
            r.active_stage = Some(drillctl_core::ActiveStage {
                stage: "preflight".to_string(),
                stage_id: stage_id.clone(),
                started_at_ms: now,
            });
            Ok(())
        })?;

        self.append(
            run_id,
            crate::events::state_transition(
                run_id,
                record.execution_id.as_str(),
                Actor::User,
                "created",
                "preflight_running",
                actor,
            ),
        )?;
        tracing::info!(run_id, actor, "run started");

        if let Some(allocation) = allocation {
            self.dispatch_stage(
                run_id,
                record.execution_id.as_str(),
                "preflight",
                &stage_id,
                duration_ms,
                &config,
                &allocation.by_worker,
            )
            .await;
        }

        self.arm_progression(run_id.to_string(), config);
        Ok(())
    }
}
