// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry and heartbeat sweep (C4).

use drillctl_core::{Capacity, Health, WorkerInfo};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

fn next_worker_seq() -> u64 {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Maps `worker_id -> WorkerInfo`, guarded by its own lock (§5,
/// "Shared-resource policy").
#[derive(Default)]
pub struct WorkerRegistry {
    workers: RwLock<HashMap<String, WorkerInfo>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, host_info: impl Into<String>, capacity: Capacity, now_ms: u64) -> String {
        let worker_id = format!("wkr_{:016x}", next_worker_seq());
        let info = WorkerInfo::new(worker_id.clone(), host_info, capacity, now_ms);
        self.workers.write().insert(worker_id.clone(), info);
        worker_id
    }

    pub fn heartbeat(&self, worker_id: &str, health: Option<Health>, now_ms: u64) -> bool {
        let mut workers = self.workers.write();
        match workers.get_mut(worker_id) {
            Some(info) => {
                info.last_heartbeat_ms = now_ms;
                info.health = health;
                true
            }
            None => false,
        }
    }

    pub fn list_workers(&self) -> Vec<WorkerInfo> {
        self.workers.read().values().cloned().collect()
    }

    pub fn get_worker(&self, worker_id: &str) -> Option<WorkerInfo> {
        self.workers.read().get(worker_id).cloned()
    }

    pub fn remove(&self, worker_id: &str) -> Option<WorkerInfo> {
        self.workers.write().remove(worker_id)
    }

    /// Worker ids whose heartbeat has gone stale as of `now_ms`, per the
    /// sweep interval/timeout the heartbeat monitor task is configured
    /// with.
    pub fn stale_worker_ids(&self, now_ms: u64, timeout_ms: u64) -> Vec<String> {
        self.workers
            .read()
            .values()
            .filter(|w| w.is_heartbeat_stale(now_ms, timeout_ms))
            .map(|w| w.worker_id.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "worker_registry_tests.rs"]
mod tests;
