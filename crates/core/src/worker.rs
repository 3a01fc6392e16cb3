// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WorkerInfo` and its nested capacity/health types (C4's registry entry).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub max_vus: u32,
    pub max_concurrent_ops: u32,
    pub max_rps: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Health {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_vus: Option<u32>,
}

/// A registered worker, per §3 ("WorkerInfo").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub worker_id: String,
    pub host_info: String,
    pub capacity: Capacity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    pub last_heartbeat_ms: u64,
}

impl WorkerInfo {
    pub fn new(worker_id: impl Into<String>, host_info: impl Into<String>, capacity: Capacity, now_ms: u64) -> Self {
        Self {
            worker_id: worker_id.into(),
            host_info: host_info.into(),
            capacity,
            health: None,
            last_heartbeat_ms: now_ms,
        }
    }

    pub fn is_heartbeat_stale(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_heartbeat_ms) >= timeout_ms
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
