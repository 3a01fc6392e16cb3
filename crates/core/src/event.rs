// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RunEvent` (C2's payload type) and the exhaustive event-type enum.

use crate::{EventId, ExecutionId, RunId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Exhaustive per §6 ("Emitted event types").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    RunCreated,
    ValidationCompleted,
    StateTransition,
    AllocationFailed,
    StageStarted,
    StageCompleted,
    StageFailed,
    StageTimeout,
    SchedulerTargetSet,
    WorkerAssigned,
    WorkerAssignmentRejected,
    WorkerRegistered,
    WorkerHeartbeat,
    WorkerCapacityLost,
    WorkerReplaced,
    StopRequested,
    EmergencyStop,
    StopConditionTriggered,
    Decision,
    AnalysisStarted,
    AnalysisCompleted,
    ReportGenerated,
    ArtifactStored,
    SystemRecovery,
    SystemWarning,
}

/// Who (or what) caused an event to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    System,
    User,
    Scheduler,
    Autoramp,
    Analysis,
    Worker,
}

crate::simple_display! {
    Actor {
        System => "system",
        User => "user",
        Scheduler => "scheduler",
        Autoramp => "autoramp",
        Analysis => "analysis",
        Worker => "worker",
    }
}

/// Optional scoping metadata attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vu_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A reference to supporting evidence for an event, e.g. a worker id or a
/// metric observation string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Evidence {
    pub fn new(kind: impl Into<String>, reference: impl Into<String>) -> Self {
        Self { kind: kind.into(), reference: reference.into(), note: None }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A single append-only log entry, per §3 ("RunEvent").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub schema_version: String,
    pub event_id: EventId,
    pub ts_ms: u64,
    pub run_id: RunId,
    pub execution_id: ExecutionId,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub actor: Actor,
    #[serde(default)]
    pub correlation: Correlation,
    pub payload: Value,
    pub evidence: Vec<Evidence>,
}

impl RunEvent {
    /// Build an event with the `event/v1` schema version filled in;
    /// `event_id`/`ts_ms` are assigned by the event log on append if left
    /// at their zero values, per §4.2.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run_id: RunId,
        execution_id: ExecutionId,
        event_type: EventType,
        actor: Actor,
        correlation: Correlation,
        payload: Value,
        evidence: Vec<Evidence>,
    ) -> Self {
        Self {
            schema_version: "event/v1".to_string(),
            event_id: EventId::from_string(""),
            ts_ms: 0,
            run_id,
            execution_id,
            event_type,
            actor,
            correlation,
            payload,
            evidence,
        }
    }

    /// Whether a `STATE_TRANSITION` event's `to_state` (carried in
    /// `payload.to_state`) is a terminal state — used by the wire crate's
    /// SSE framer to auto-close a stream.
    pub fn is_terminal_transition(&self) -> bool {
        if self.event_type != EventType::StateTransition {
            return false;
        }
        matches!(
            self.payload.get("to_state").and_then(Value::as_str),
            Some("completed") | Some("failed") | Some("aborted")
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
