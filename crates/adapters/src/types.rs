// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data shapes exchanged with the collaborator traits (§6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One executed operation as reported by the telemetry collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub ts_ms: u64,
    pub operation: String,
    pub ok: bool,
    pub latency_ms: f64,
    #[serde(default)]
    pub tags: Value,
}

/// Snapshot of a run's telemetry, per `TelemetryStore.get_telemetry_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryData {
    pub run_id: String,
    pub scenario_id: String,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub operations: Vec<OperationRecord>,
}

/// Result of `TelemetryStore.get_streaming_metrics`, used by C9's streaming
/// stop-condition family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamingMetrics {
    pub seconds_since_last_event: u64,
    pub events_per_second: f64,
}

/// Result of `ArtifactStore.save_artifact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
}

/// Computed metrics produced by an `Aggregator`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_ops: u64,
    pub failed_ops: u64,
    pub error_rate: f64,
    pub latency_p50_ms: f64,
    pub latency_p95_ms: f64,
    pub latency_p99_ms: f64,
}

/// The input a `Reporter` renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub run_id: String,
    pub scenario_id: String,
    pub metrics: Metrics,
    #[serde(default)]
    pub stop_reason: Option<String>,
}
