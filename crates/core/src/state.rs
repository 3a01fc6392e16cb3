// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run state machine (C1): states and admitted transitions.
//!
//! This module is intentionally pure — [`RunState::can_transition`] has no
//! side effects and no dependency on the registry lock, so it can be unit
//! tested exhaustively and reused by the orchestrator as a guard before any
//! mutation.

use serde::{Deserialize, Serialize};

/// A run's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Created,
    PreflightRunning,
    PreflightPassed,
    PreflightFailed,
    BaselineRunning,
    RampRunning,
    SoakRunning,
    Stopping,
    Analyzing,
    Completed,
    Failed,
    Aborted,
}

crate::simple_display! {
    RunState {
        Created => "created",
        PreflightRunning => "preflight_running",
        PreflightPassed => "preflight_passed",
        PreflightFailed => "preflight_failed",
        BaselineRunning => "baseline_running",
        RampRunning => "ramp_running",
        SoakRunning => "soak_running",
        Stopping => "stopping",
        Analyzing => "analyzing",
        Completed => "completed",
        Failed => "failed",
        Aborted => "aborted",
    }
}

impl RunState {
    /// True for states with no outgoing edges.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed | RunState::Aborted)
    }

    /// The admitted next states from `self`, per §4.1. Terminal states have
    /// no outgoing edges; everything not listed here is rejected.
    pub fn allowed_next(self) -> &'static [RunState] {
        use RunState::*;
        match self {
            Created => &[PreflightRunning, Failed, Aborted],
            PreflightRunning => &[PreflightPassed, PreflightFailed, Stopping],
            PreflightFailed => &[Stopping],
            PreflightPassed => &[BaselineRunning, Stopping],
            BaselineRunning => &[RampRunning, Stopping],
            RampRunning => &[SoakRunning, Stopping],
            SoakRunning => &[Stopping],
            // Self-loop retained only so a duplicate stop request can be
            // recorded as a no-op decision event (open question iii).
            Stopping => &[Analyzing, Stopping],
            Analyzing => &[Completed, Failed, Aborted],
            Completed | Failed | Aborted => &[],
        }
    }

    /// Whether `self -> to` is an admitted transition.
    pub fn can_transition(self, to: RunState) -> bool {
        self.allowed_next().contains(&to)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
