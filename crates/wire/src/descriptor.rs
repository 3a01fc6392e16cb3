// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The assignment descriptor delivered to the injected assignment sender,
//! per §6 ("Assignment descriptor delivered to the injected sender").

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireTarget {
    pub url: String,
    pub transport: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub redirect_policy: Option<String>,
    #[serde(default)]
    pub auth: Option<Value>,
}

impl WireTarget {
    /// Expands `${run_id}` in header values, per §6.
    pub fn with_run_id_expanded(mut self, run_id: &str) -> Self {
        for value in self.headers.values_mut() {
            if value.contains("${run_id}") {
                *value = value.replace("${run_id}", run_id);
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOpMixEntry {
    pub operation: String,
    pub weight: f64,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub prompt_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireWorkload {
    pub op_mix: Vec<WireOpMixEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireSessionPolicy {
    pub mode: String,
    #[serde(default)]
    pub pool_size: Option<u32>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    #[serde(default)]
    pub max_idle_ms: Option<u64>,
}

/// A single worker's marching orders for one VU range of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAssignment {
    pub run_id: String,
    pub execution_id: String,
    pub stage: String,
    pub stage_id: String,
    pub lease_id: String,
    pub vuid_start: u32,
    pub vuid_end: u32,
    pub duration_ms: u64,
    pub target: WireTarget,
    pub workload: WireWorkload,
    pub session_policy: WireSessionPolicy,
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
