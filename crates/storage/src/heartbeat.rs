// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The heartbeat monitor's periodic sweep (C4).

use crate::WorkerRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Invoked once per worker that has timed out, with the run ids the lease
/// manager reports as affected (§4.4).
#[async_trait]
pub trait WorkerLostCallback: Send + Sync {
    async fn on_worker_lost(&self, worker_id: &str);
}

/// Configuration for the sweep loop.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    pub sweep_interval: Duration,
    pub timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self { sweep_interval: Duration::from_millis(100), timeout: Duration::from_millis(500) }
    }
}

/// Runs the periodic sweep described in §4.4 until `cancel` fires: compare
/// `now - last_heartbeat_ms` against `timeout`, remove stale workers, and
/// fan out to `callback`.
pub async fn run_heartbeat_sweep<C: drillctl_core::Clock + 'static>(
    registry: Arc<WorkerRegistry>,
    callback: Arc<dyn WorkerLostCallback>,
    config: HeartbeatConfig,
    clock: C,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.sweep_interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {
                let now_ms = clock.epoch_ms();
                let stale = registry.stale_worker_ids(now_ms, config.timeout.as_millis() as u64);
                for worker_id in stale {
                    if registry.remove(&worker_id).is_some() {
                        tracing::warn!(worker_id = %worker_id, "worker heartbeat timed out");
                        callback.on_worker_lost(&worker_id).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
