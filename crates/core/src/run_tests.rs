// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample() -> RunRecord {
    RunRecord::new(
        RunId::generate(),
        ExecutionId::generate(),
        "smoke",
        "a".repeat(64),
        b"{}".to_vec(),
        1_000,
    )
}

#[test]
fn new_record_starts_created() {
    let rec = sample();
    assert_eq!(rec.state, RunState::Created);
    assert_eq!(rec.created_at_ms, rec.updated_at_ms);
    assert!(rec.active_stage.is_none());
    assert!(rec.stop_reason.is_none());
    assert!(!rec.immediate_stop);
}

#[test]
fn transition_updates_state_and_timestamp() {
    let mut rec = sample();
    rec.transition(RunState::PreflightRunning, 2_000).unwrap();
    assert_eq!(rec.state, RunState::PreflightRunning);
    assert_eq!(rec.updated_at_ms, 2_000);
}

#[test]
fn transition_rejects_invalid_edge() {
    let mut rec = sample();
    let err = rec.transition(RunState::Completed, 2_000).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidTransition { .. }));
    assert_eq!(rec.state, RunState::Created);
}

#[test]
fn is_terminal_reflects_state() {
    let mut rec = sample();
    assert!(!rec.is_terminal());
    rec.transition(RunState::Failed, 2_000).unwrap();
    assert!(rec.is_terminal());
}
