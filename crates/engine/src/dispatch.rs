// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker assignment dispatch, shared by `StartRun`, each stage
//! transition, the auto-ramp driver's delta dispatch, and the
//! `replace_if_possible` worker-failure path (§4.7/§4.8/§4.10).

use crate::orchestrator::Orchestrator;
use drillctl_config::RunConfig;
use drillctl_core::{Actor, Assignment, Clock, Correlation, Evidence, EventType};
use drillctl_wire::WorkerAssignment;
use std::collections::HashMap;

impl<C: Clock + 'static> Orchestrator<C> {
    /// Issues a lease and pushes a `WorkerAssignment` for every entry in
    /// `by_worker`. A single worker's failure is logged and mirrored as a
    /// `WORKER_ASSIGNMENT_REJECTED` event; it never fails the run (§7). The
    /// caller must have already confirmed the scheduler trio is wired.
    /// Returns the number of assignments successfully delivered.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn dispatch_stage(
        &self,
        run_id: &str,
        execution_id: &str,
        stage: &str,
        stage_id: &str,
        duration_ms: u64,
        config: &RunConfig,
        by_worker: &HashMap<String, Assignment>,
    ) -> usize {
        let Some(lease_manager) = &self.collaborators.lease_manager else { return 0 };
        let Some(sender) = &self.collaborators.assignment_sender else { return 0 };
        let now = self.now_ms();

        let target = crate::mapping::target(&config.target).with_run_id_expanded(run_id);
        let workload = crate::mapping::workload(&config.workload);
        let session_policy = crate::mapping::session_policy(&config.session_policy);

        let mut dispatched = 0usize;
        for (worker_id, assignment) in by_worker {
            let lease_id = lease_manager.issue_lease(worker_id, assignment.clone(), now);
            let descriptor = WorkerAssignment {
                run_id: run_id.to_string(),
                execution_id: execution_id.to_string(),
                stage: stage.to_string(),
                stage_id: stage_id.to_string(),
                lease_id: lease_id.clone(),
                vuid_start: assignment.vuid_range.start,
                vuid_end: assignment.vuid_range.end,
                duration_ms,
                target: target.clone(),
                workload: workload.clone(),
                session_policy: session_policy.clone(),
            };

            match sender.add_assignment(worker_id, descriptor).await {
                Ok(()) => {
                    dispatched += 1;
                    let correlation = Correlation {
                        stage: Some(stage.to_string()),
                        stage_id: Some(stage_id.to_string()),
                        worker_id: Some(worker_id.clone()),
                        ..Default::default()
                    };
                    let _ = self.append(
                        run_id,
                        crate::events::build(
                            run_id,
                            execution_id,
                            EventType::WorkerAssigned,
                            Actor::Scheduler,
                            correlation,
                            serde_json::json!({
                                "worker_id": worker_id,
                                "lease_id": lease_id,
                                "vuid_start": assignment.vuid_range.start,
                                "vuid_end": assignment.vuid_range.end,
                            }),
                            vec![],
                        ),
                    );
                }
                Err(err) => {
                    tracing::warn!(run_id, worker_id, error = %err, "assignment rejected");
                    let _ = self.append(
                        run_id,
                        crate::events::build(
                            run_id,
                            execution_id,
                            EventType::WorkerAssignmentRejected,
                            Actor::Scheduler,
                            Correlation { worker_id: Some(worker_id.clone()), ..Default::default() },
                            serde_json::json!({ "worker_id": worker_id, "reason": err.to_string() }),
                            vec![Evidence::new("worker", worker_id.clone())],
                        ),
                    );
                }
            }
        }
        dispatched
    }
}
