// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    Assignment, Capacity, Evidence, ExecutionId, Lease, RunEvent, RunId, RunRecord, VuidRange,
    WorkerInfo,
};

/// Proptest strategies shared by this crate's own tests and by
/// `drillctl-storage`'s allocator/event-log property tests.
#[cfg(feature = "proptest")]
pub mod strategies {
    use crate::Capacity;
    use proptest::prelude::*;

    pub fn arb_capacity() -> impl Strategy<Value = Capacity> {
        (1u32..=1000, 1u32..=500, 1u32..=5000).prop_map(|(max_vus, max_concurrent_ops, max_rps)| {
            Capacity { max_vus, max_concurrent_ops, max_rps }
        })
    }

    pub fn arb_worker_ids(max: usize) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("worker_[a-z0-9]{4,8}", 1..=max)
    }
}

crate::builder! {
    pub struct RunRecordBuilder => RunRecord {
        into {
            scenario_id: String = "smoke",
            config_hash: String = "0".repeat(64),
        }
        set {
            created_at_ms: u64 = 1_000,
            updated_at_ms: u64 = 1_000,
            immediate_stop: bool = false,
        }
        option {
            active_stage: crate::ActiveStage = None,
            stop_reason: crate::StopReason = None,
        }
        computed {
            run_id: RunId = RunId::generate(),
            execution_id: ExecutionId = ExecutionId::generate(),
            state: crate::RunState = crate::RunState::Created,
            config_bytes: Vec<u8> = b"{}".to_vec(),
        }
    }
}

crate::builder! {
    pub struct WorkerInfoBuilder => WorkerInfo {
        into {
            worker_id: String = "worker_1",
            host_info: String = "test-host",
        }
        set {
            capacity: Capacity = Capacity { max_vus: 100, max_concurrent_ops: 50, max_rps: 1000 },
            last_heartbeat_ms: u64 = 1_000,
        }
        option {
            health: crate::Health = None,
        }
    }
}

/// Build a minimal, well-formed `RunEvent` for tests that only care about
/// log mechanics (capacity, ordering, tailing), not payload content.
pub fn sample_event(run_id: &str, execution_id: &str, event_type: crate::EventType) -> RunEvent {
    RunEvent::new(
        RunId::from_string(run_id),
        ExecutionId::from_string(execution_id),
        event_type,
        crate::Actor::System,
        crate::Correlation::default(),
        serde_json::json!({}),
        vec![Evidence::new("test", "fixture")],
    )
}

pub fn sample_assignment(run_id: &str, stage_id: &str, start: u32, end: u32) -> Assignment {
    Assignment::new(run_id, stage_id, VuidRange::new(start, end))
}

pub fn sample_lease(lease_id: &str, worker_id: &str, assignment: Assignment, issued_at_ms: u64) -> Lease {
    Lease::new(lease_id, worker_id, assignment, issued_at_ms)
}
