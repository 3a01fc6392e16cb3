// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lease manager (C6): issues, tracks, and revokes per-worker leases.

use drillctl_core::{Assignment, Lease};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

fn next_lease_seq() -> u64 {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    SEQ.fetch_add(1, Ordering::Relaxed)
}

#[derive(Default)]
struct Indexes {
    /// lease_id -> Lease
    leases: HashMap<String, Lease>,
    /// run_id -> worker_ids holding an active lease for it
    run_to_workers: HashMap<String, HashSet<String>>,
    /// worker_id -> run_ids it holds an active lease for
    worker_to_runs: HashMap<String, HashSet<String>>,
}

/// Tracks active and revoked leases plus the bidirectional run/worker
/// indexes used by the heartbeat monitor's capacity-loss fan-out (§4.4)
/// and the worker-failure handler (§4.10).
#[derive(Default)]
pub struct LeaseManager {
    state: RwLock<Indexes>,
}

impl LeaseManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_lease(&self, worker_id: &str, assignment: Assignment, issued_at_ms: u64) -> String {
        let lease_id = format!("lse_{:016x}", next_lease_seq());
        let run_id = assignment.run_id.clone();
        let lease = Lease::new(lease_id.clone(), worker_id, assignment, issued_at_ms);

        let mut state = self.state.write();
        state.leases.insert(lease_id.clone(), lease);
        state.run_to_workers.entry(run_id.clone()).or_default().insert(worker_id.to_string());
        state.worker_to_runs.entry(worker_id.to_string()).or_default().insert(run_id);
        lease_id
    }

    /// Marks every active lease for `run_id` as revoked. Idempotent.
    pub fn revoke_leases_by_run(&self, run_id: &str) {
        let mut state = self.state.write();
        for lease in state.leases.values_mut() {
            if lease.assignment.run_id == run_id {
                lease.revoke();
            }
        }
        if let Some(workers) = state.run_to_workers.remove(run_id) {
            for worker_id in workers {
                if let Some(runs) = state.worker_to_runs.get_mut(&worker_id) {
                    runs.remove(run_id);
                }
            }
        }
    }

    /// Revokes a single lease by id. Idempotent; returns false if unknown.
    pub fn revoke_lease(&self, lease_id: &str) -> bool {
        let mut state = self.state.write();
        let Some(lease) = state.leases.get_mut(lease_id) else { return false };
        let (run_id, worker_id) = (lease.assignment.run_id.clone(), lease.worker_id.clone());
        lease.revoke();
        if let Some(workers) = state.run_to_workers.get_mut(&run_id) {
            workers.remove(&worker_id);
        }
        if let Some(runs) = state.worker_to_runs.get_mut(&worker_id) {
            runs.remove(&run_id);
        }
        true
    }

    /// Distinct run_ids this worker holds active leases for, per §4.4.
    pub fn list_worker_run_ids(&self, worker_id: &str) -> Vec<String> {
        self.state.read().worker_to_runs.get(worker_id).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    /// All leases (active and revoked) for a run.
    pub fn list_leases(&self, run_id: &str) -> Vec<Lease> {
        self.state
            .read()
            .leases
            .values()
            .filter(|l| l.assignment.run_id == run_id)
            .cloned()
            .collect()
    }

    /// Eagerly revokes any active lease older than `max_lifetime_ms`.
    pub fn sweep_expired(&self, now_ms: u64, max_lifetime_ms: u64) {
        let expired: Vec<String> = {
            let state = self.state.read();
            state
                .leases
                .values()
                .filter(|l| l.is_active() && l.has_expired(now_ms, max_lifetime_ms))
                .map(|l| l.lease_id.clone())
                .collect()
        };
        for lease_id in expired {
            self.revoke_lease(&lease_id);
        }
    }
}

#[cfg(test)]
#[path = "lease_manager_tests.rs"]
mod tests;
