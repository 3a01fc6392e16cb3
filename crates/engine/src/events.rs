// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for building `RunEvent`s (§3/§6). Kept separate from the
//! orchestrator so every call site constructs events the same way instead
//! of re-deriving `schema_version`/correlation boilerplate.

use drillctl_core::{Actor, Correlation, Evidence, EventType, ExecutionId, RunEvent, RunId};
use serde_json::Value;

#[allow(clippy::too_many_arguments)]
pub fn build(
    run_id: &str,
    execution_id: &str,
    event_type: EventType,
    actor: Actor,
    correlation: Correlation,
    payload: Value,
    evidence: Vec<Evidence>,
) -> RunEvent {
    RunEvent::new(
        RunId::from_string(run_id),
        ExecutionId::from_string(execution_id),
        event_type,
        actor,
        correlation,
        payload,
        evidence,
    )
}

pub fn state_transition(run_id: &str, execution_id: &str, actor: Actor, from: &str, to: &str, trigger: &str) -> RunEvent {
    build(
        run_id,
        execution_id,
        EventType::StateTransition,
        actor,
        Correlation::default(),
        serde_json::json!({ "from_state": from, "to_state": to, "trigger": trigger }),
        vec![],
    )
}

pub fn decision(run_id: &str, execution_id: &str, actor: Actor, kind: &str, detail: Value) -> RunEvent {
    let mut payload = serde_json::json!({ "kind": kind });
    if let Value::Object(ref mut map) = payload {
        if let Value::Object(extra) = detail {
            map.extend(extra);
        }
    }
    build(run_id, execution_id, EventType::Decision, actor, Correlation::default(), payload, vec![])
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
