// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VU allocator (C5): splits a target VU count across workers.

use drillctl_core::{Assignment, Error, Result, VuidRange};
use std::collections::HashMap;

/// A candidate worker for allocation: an id plus its `max_vus`.
#[derive(Debug, Clone)]
pub struct WorkerCapacity {
    pub worker_id: String,
    pub max_vus: u32,
}

/// The result of an allocation call: the assignment list plus a lookup by
/// worker id, both describing the same partition of `[0, target_vus)`.
#[derive(Debug, Clone)]
pub struct AllocationResult {
    pub assignments: Vec<Assignment>,
    pub by_worker: HashMap<String, Assignment>,
}

/// Even-split partition of `[0, target_vus)` across `workers`, remainder
/// given to the first workers, per §4.5.
pub fn allocate(
    run_id: &str,
    stage_id: &str,
    target_vus: u32,
    workers: &[WorkerCapacity],
) -> Result<AllocationResult> {
    if workers.is_empty() {
        return Err(Error::internal("no workers available"));
    }
    let total_capacity: u64 = workers.iter().map(|w| w.max_vus as u64).sum();
    if total_capacity < target_vus as u64 {
        return Err(Error::internal("insufficient total capacity for target VUs"));
    }

    let n = workers.len() as u32;
    let base = target_vus / n;
    let remainder = target_vus % n;

    let mut assignments = Vec::with_capacity(workers.len());
    let mut by_worker = HashMap::with_capacity(workers.len());
    let mut cursor = 0u32;
    for (i, worker) in workers.iter().enumerate() {
        let share = base + if (i as u32) < remainder { 1 } else { 0 };
        let range = VuidRange::new(cursor, cursor + share);
        cursor += share;
        let assignment = Assignment::new(run_id, stage_id, range);
        by_worker.insert(worker.worker_id.clone(), assignment.clone());
        assignments.push(assignment);
    }

    Ok(AllocationResult { assignments, by_worker })
}

/// Same computation as [`allocate`] after removing `excluded_worker_ids`
/// from the candidate list, per §4.5.
pub fn reallocate(
    run_id: &str,
    stage_id: &str,
    target_vus: u32,
    workers: &[WorkerCapacity],
    excluded_worker_ids: &[String],
) -> Result<AllocationResult> {
    let remaining: Vec<WorkerCapacity> = workers
        .iter()
        .filter(|w| !excluded_worker_ids.iter().any(|ex| ex == &w.worker_id))
        .cloned()
        .collect();
    if remaining.is_empty() {
        return Err(Error::internal("no workers available"));
    }
    allocate(run_id, stage_id, target_vus, &remaining)
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;
