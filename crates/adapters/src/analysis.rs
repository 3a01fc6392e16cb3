// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Aggregator` and `Reporter`, per §6. Both are pure computation over
//! data already fetched from the telemetry collaborator — no I/O, so
//! neither trait is `async`.

use crate::types::{Metrics, OperationRecord, Report};

/// Computes summary metrics from a run's operations. The percentile math
/// itself is out of scope (§1); this trait is the contract the
/// orchestrator drives during `ANALYZING`.
pub trait Aggregator: Send + Sync {
    fn set_time_range(&mut self, start_ms: u64, end_ms: u64);
    fn add_operation(&mut self, op: &OperationRecord);
    fn compute(&self) -> Metrics;
}

/// Renders a finished `Report` into bytes for the artifact store.
pub trait Reporter: Send + Sync {
    fn generate_json(&self, report: &Report) -> Vec<u8>;
    fn generate_html(&self, report: &Report) -> Vec<u8>;
}
