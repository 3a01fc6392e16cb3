// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed view the core consumes, projected from raw config bytes (C3).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

fn default_true() -> bool {
    true
}

fn default_drain_timeout_ms() -> u64 {
    30_000
}

fn default_analysis_timeout_ms() -> u64 {
    1_800_000
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Target {
    pub url: String,
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub redirect_policy: Option<String>,
    #[serde(default)]
    pub auth: Option<Value>,
}

/// One entry of a workload's operation mix.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OpMixEntry {
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

/// `operation_mix` is accepted as an alias for `op_mix`, per §4.3.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Workload {
    #[serde(default, alias = "operation_mix")]
    pub op_mix: Vec<OpMixEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolTemplate {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Tools {
    #[serde(default)]
    pub templates: Vec<ToolTemplate>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionPolicy {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub pool_size: Option<u32>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    #[serde(default)]
    pub max_idle_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HardCaps {
    #[serde(default)]
    pub max_vus: Option<u32>,
    #[serde(default)]
    pub max_duration_ms: Option<u64>,
    #[serde(default)]
    pub max_errors: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StopPolicy {
    #[serde(default)]
    pub mode: String,
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self { mode: String::new(), drain_timeout_ms: default_drain_timeout_ms() }
    }
}

/// §4.3: default `fail_fast`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerFailurePolicy {
    #[default]
    FailFast,
    ReplaceIfPossible,
    BestEffort,
}

drillctl_core::simple_display! {
    WorkerFailurePolicy {
        FailFast => "fail_fast",
        ReplaceIfPossible => "replace_if_possible",
        BestEffort => "best_effort",
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Safety {
    #[serde(default)]
    pub hard_caps: HardCaps,
    #[serde(default)]
    pub stop_policy: StopPolicy,
    #[serde(default = "default_analysis_timeout_ms")]
    pub analysis_timeout_ms: u64,
    #[serde(default)]
    pub worker_failure_policy: WorkerFailurePolicy,
}

impl Default for Safety {
    fn default() -> Self {
        Self {
            hard_caps: HardCaps::default(),
            stop_policy: StopPolicy::default(),
            analysis_timeout_ms: default_analysis_timeout_ms(),
            worker_failure_policy: WorkerFailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Preflight,
    Baseline,
    Ramp,
    Soak,
    Spike,
    Custom,
}

drillctl_core::simple_display! {
    StageKind {
        Preflight => "preflight",
        Baseline => "baseline",
        Ramp => "ramp",
        Soak => "soak",
        Spike => "spike",
        Custom => "custom",
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Load {
    pub target_vus: u32,
    #[serde(default)]
    pub start_vus: Option<u32>,
    #[serde(default)]
    pub ramp_steps: Option<u32>,
    #[serde(default)]
    pub step_hold_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "==")]
    Eq,
}

impl Comparator {
    pub fn compare(&self, observed: f64, threshold: f64) -> bool {
        match self {
            Comparator::Gt => observed > threshold,
            Comparator::Gte => observed >= threshold,
            Comparator::Lt => observed < threshold,
            Comparator::Lte => observed <= threshold,
            Comparator::Eq => (observed - threshold).abs() < f64::EPSILON,
        }
    }
}

drillctl_core::simple_display! {
    Comparator {
        Gt => ">",
        Gte => ">=",
        Lt => "<",
        Lte => "<=",
        Eq => "==",
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StopCondition {
    pub metric: String,
    pub comparator: Comparator,
    pub threshold: f64,
    pub window_ms: u64,
    pub sustain_windows: u32,
    #[serde(default)]
    pub scope: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingStopCondition {
    pub stream_stall_seconds: u64,
    pub min_events_per_second: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Stage {
    pub stage_id: String,
    pub stage: StageKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub duration_ms: u64,
    #[serde(default)]
    pub max_duration_ms: Option<u64>,
    pub load: Load,
    #[serde(default)]
    pub stop_conditions: Vec<StopCondition>,
    #[serde(default)]
    pub streaming_stop_conditions: Option<StreamingStopCondition>,
}

/// The projected, typed view of a run's config (C3's output), per §4.3.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default)]
    pub scenario_id: String,
    pub target: Target,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub workload: Workload,
    #[serde(default)]
    pub tools: Tools,
    #[serde(default)]
    pub session_policy: SessionPolicy,
    #[serde(default)]
    pub safety: Safety,
}

impl RunConfig {
    /// First enabled stage whose `stage` kind prints as `name`, or `None`.
    pub fn find_stage_by_name(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.enabled && s.stage.to_string() == name)
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
