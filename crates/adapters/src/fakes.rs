// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake collaborator implementations used by the engine's own test suite
//! to exercise full run lifecycles without real external systems.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::analysis::{Aggregator, Reporter};
use crate::artifact::ArtifactStore;
use crate::assignment_sender::AssignmentSender;
use crate::error::Result;
use crate::telemetry::TelemetryStore;
use crate::types::{ArtifactRef, Metrics, OperationRecord, Report, StreamingMetrics, TelemetryData};
use crate::validator::Validator;
use async_trait::async_trait;
use drillctl_core::ValidationReport;
use drillctl_wire::WorkerAssignment;
use parking_lot::Mutex;

/// Always reports the config valid. Construct with `.failing(...)` to
/// simulate a validation error in tests of `CreateRun`'s failure path.
#[derive(Default)]
pub struct FakeValidator {
    report: Mutex<Option<ValidationReport>>,
}

impl FakeValidator {
    pub fn failing(errors: Vec<String>) -> Self {
        Self { report: Mutex::new(Some(ValidationReport::failed(errors))) }
    }
}

#[async_trait]
impl Validator for FakeValidator {
    async fn validate(&self, _config_bytes: &[u8]) -> ValidationReport {
        self.report.lock().clone().unwrap_or_else(ValidationReport::ok)
    }
}

/// Records every assignment pushed to it, in order.
#[derive(Default)]
pub struct FakeAssignmentSender {
    pub sent: Mutex<Vec<(String, WorkerAssignment)>>,
}

impl FakeAssignmentSender {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl AssignmentSender for FakeAssignmentSender {
    async fn add_assignment(&self, worker_id: &str, assignment: WorkerAssignment) -> Result<()> {
        self.sent.lock().push((worker_id.to_string(), assignment));
        Ok(())
    }
}

/// In-memory telemetry collaborator; tests seed it via `push_operation`.
#[derive(Default)]
pub struct FakeTelemetryStore {
    operations: Mutex<Vec<OperationRecord>>,
    metadata: Mutex<Option<(String, Option<String>)>>,
    streaming: Mutex<Option<StreamingMetrics>>,
}

impl FakeTelemetryStore {
    pub fn push_operation(&self, op: OperationRecord) {
        self.operations.lock().push(op);
    }

    pub fn set_streaming_metrics(&self, metrics: StreamingMetrics) {
        *self.streaming.lock() = Some(metrics);
    }

    pub fn last_metadata(&self) -> Option<(String, Option<String>)> {
        self.metadata.lock().clone()
    }
}

#[async_trait]
impl TelemetryStore for FakeTelemetryStore {
    async fn get_telemetry_data(&self, run_id: &str) -> Result<TelemetryData> {
        Ok(TelemetryData {
            run_id: run_id.to_string(),
            scenario_id: "fake".to_string(),
            start_time_ms: 0,
            end_time_ms: 0,
            stop_reason: None,
            operations: self.operations.lock().clone(),
        })
    }

    async fn set_run_metadata(&self, _run_id: &str, scenario_id: &str, stop_reason: Option<&str>) -> Result<()> {
        *self.metadata.lock() = Some((scenario_id.to_string(), stop_reason.map(str::to_string)));
        Ok(())
    }

    async fn get_streaming_metrics(&self, _run_id: &str) -> Option<StreamingMetrics> {
        *self.streaming.lock()
    }
}

/// Records every saved artifact; never touches the filesystem.
#[derive(Default)]
pub struct FakeArtifactStore {
    pub saved: Mutex<Vec<ArtifactRef>>,
}

#[async_trait]
impl ArtifactStore for FakeArtifactStore {
    async fn save_artifact(&self, _run_id: &str, _kind: &str, filename: &str, bytes: &[u8]) -> Result<ArtifactRef> {
        let artifact = ArtifactRef { filename: filename.to_string(), path: format!("fake:///{filename}"), size_bytes: bytes.len() as u64 };
        self.saved.lock().push(artifact.clone());
        Ok(artifact)
    }
}

/// Counts operations and reports a fixed error rate computed from them.
#[derive(Default)]
pub struct FakeAggregator {
    total: u64,
    failed: u64,
}

impl Aggregator for FakeAggregator {
    fn set_time_range(&mut self, _start_ms: u64, _end_ms: u64) {}

    fn add_operation(&mut self, op: &OperationRecord) {
        self.total += 1;
        if !op.ok {
            self.failed += 1;
        }
    }

    fn compute(&self) -> Metrics {
        let error_rate = if self.total == 0 { 0.0 } else { self.failed as f64 / self.total as f64 };
        Metrics { total_ops: self.total, failed_ops: self.failed, error_rate, ..Metrics::default() }
    }
}

/// Renders trivially-serialized JSON/HTML, enough to assert shapes in
/// tests without depending on real templating.
#[derive(Default)]
pub struct FakeReporter;

impl Reporter for FakeReporter {
    fn generate_json(&self, report: &Report) -> Vec<u8> {
        serde_json::to_vec(report).unwrap_or_default()
    }

    fn generate_html(&self, report: &Report) -> Vec<u8> {
        format!("<html><body>{}</body></html>", report.run_id).into_bytes()
    }
}

#[cfg(test)]
#[path = "fakes_tests.rs"]
mod tests;
