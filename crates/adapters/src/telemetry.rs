// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TelemetryStore`, per §6. The telemetry aggregation math itself (§1
//! Non-goals) lives outside this workspace; this trait is the narrow read/
//! write contract the orchestrator and the stop-condition evaluator (C9)
//! use against it.

use crate::error::Result;
use crate::types::{StreamingMetrics, TelemetryData};
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryStore: Send + Sync {
    async fn get_telemetry_data(&self, run_id: &str) -> Result<TelemetryData>;

    async fn set_run_metadata(&self, run_id: &str, scenario_id: &str, stop_reason: Option<&str>) -> Result<()>;

    /// Optional streaming-metrics capability (§4.9's "streaming
    /// conditions"). Implementations that don't support it return `None`.
    async fn get_streaming_metrics(&self, _run_id: &str) -> Option<StreamingMetrics> {
        None
    }
}
