// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RunRecord`, the orchestrator's central owned type (§3).
//!
//! Control handles (cancellation tokens for progression, ramp, stop
//! conditions, and drain) are deliberately not part of this type: they
//! depend on `tokio_util`, which this crate does not pull in. The engine
//! crate keeps them in a side table keyed by `run_id`, mutated under the
//! same registry lock that guards `RunRecord` (§5, "Shared-resource
//! policy"). This struct carries only the data §3 lists as part of the
//! record itself.

use crate::{ExecutionId, RunId, RunState};
use serde::{Deserialize, Serialize};

/// The stage a run is currently executing, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStage {
    pub stage: String,
    pub stage_id: String,
    pub started_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopMode {
    Drain,
    Immediate,
}

crate::simple_display! {
    StopMode {
        Drain => "drain",
        Immediate => "immediate",
    }
}

/// Why and how a run was asked to stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopReason {
    pub mode: StopMode,
    pub reason: String,
    pub actor: String,
    pub at_ms: u64,
}

/// The full mutable state of a single run, mutated only under the run
/// registry's lock (§3 invariant (a)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: RunId,
    pub execution_id: ExecutionId,
    pub scenario_id: String,
    pub config_hash: String,
    pub state: RunState,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    pub active_stage: Option<ActiveStage>,
    pub stop_reason: Option<StopReason>,
    /// Set when `EmergencyStop` escalates a `stopping` run, per §4.7.
    pub immediate_stop: bool,
    /// Raw config bytes, used to re-project on demand; never mutated.
    #[serde(skip)]
    pub config_bytes: Vec<u8>,
}

impl RunRecord {
    pub fn new(
        run_id: RunId,
        execution_id: ExecutionId,
        scenario_id: impl Into<String>,
        config_hash: impl Into<String>,
        config_bytes: Vec<u8>,
        now_ms: u64,
    ) -> Self {
        Self {
            run_id,
            execution_id,
            scenario_id: scenario_id.into(),
            config_hash: config_hash.into(),
            state: RunState::Created,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            active_stage: None,
            stop_reason: None,
            immediate_stop: false,
            config_bytes,
        }
    }

    /// Move to `to` if admitted, bumping `updated_at_ms`. Callers are
    /// expected to hold the registry lock.
    pub fn transition(&mut self, to: RunState, now_ms: u64) -> Result<(), crate::Error> {
        if !self.state.can_transition(to) {
            return Err(crate::Error::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.state = to;
        self.updated_at_ms = now_ms;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
