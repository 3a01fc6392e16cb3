// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn state_transition_payload_carries_from_to_and_trigger() {
    let event = state_transition("run_1", "exe_1", Actor::System, "created", "preflight_running", "start_run");
    assert_eq!(event.event_type, EventType::StateTransition);
    assert_eq!(event.payload["from_state"], "created");
    assert_eq!(event.payload["to_state"], "preflight_running");
}

#[test]
fn decision_merges_kind_with_extra_detail() {
    let event = decision("run_1", "exe_1", Actor::User, "stop_trigger_ignored", serde_json::json!({ "escalated": true }));
    assert_eq!(event.payload["kind"], "stop_trigger_ignored");
    assert_eq!(event.payload["escalated"], true);
}
