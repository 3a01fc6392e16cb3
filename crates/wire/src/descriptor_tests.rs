// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn run_id_expansion_replaces_placeholder_in_headers() {
    let mut headers = HashMap::new();
    headers.insert("X-Run-Id".to_string(), "run=${run_id}".to_string());
    let target = WireTarget { url: "http://x".to_string(), transport: "http".to_string(), headers, ..Default::default() };

    let expanded = target.with_run_id_expanded("run_abc123");
    assert_eq!(expanded.headers.get("X-Run-Id").unwrap(), "run=run_abc123");
}

#[test]
fn assignment_round_trips_through_json() {
    let assignment = WorkerAssignment {
        run_id: "run_abc".to_string(),
        execution_id: "exe_def".to_string(),
        stage: "baseline".to_string(),
        stage_id: "stg_1".to_string(),
        lease_id: "lse_1".to_string(),
        vuid_start: 0,
        vuid_end: 10,
        duration_ms: 60_000,
        target: WireTarget::default(),
        workload: WireWorkload::default(),
        session_policy: WireSessionPolicy::default(),
    };
    let json = serde_json::to_string(&assignment).unwrap();
    let round_tripped: WorkerAssignment = serde_json::from_str(&json).unwrap();
    assert_eq!(round_tripped, assignment);
}
