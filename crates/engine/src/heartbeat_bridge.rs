// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges `drillctl-storage`'s heartbeat sweep to the worker-failure
//! handler (§4.4: "The core wires this callback to §4.10").

use crate::orchestrator::Orchestrator;
use async_trait::async_trait;
use drillctl_core::Clock;
use drillctl_storage::heartbeat::WorkerLostCallback;

pub struct OrchestratorWorkerLostCallback<C: Clock + 'static> {
    orchestrator: std::sync::Arc<Orchestrator<C>>,
}

impl<C: Clock + 'static> OrchestratorWorkerLostCallback<C> {
    pub fn new(orchestrator: std::sync::Arc<Orchestrator<C>>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl<C: Clock + 'static> WorkerLostCallback for OrchestratorWorkerLostCallback<C> {
    async fn on_worker_lost(&self, worker_id: &str) {
        for run_id in self.orchestrator.get_runs_for_worker(worker_id) {
            if let Err(err) = self.orchestrator.handle_worker_capacity_lost(&run_id, worker_id).await {
                tracing::warn!(run_id, worker_id, error = %err, "worker-failure handling failed");
            }
        }
    }
}
