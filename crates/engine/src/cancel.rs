// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control handles a `RunRecord` doesn't carry directly (§3: "Control
//! handles not exposed externally"). `drillctl-core` has no dependency on
//! `tokio_util`, so this side table — keyed by `run_id`, mutated under the
//! same orchestrator lock that guards the record itself — is where the
//! engine keeps them (§9, "multiple cancellation tokens per record").

use tokio_util::sync::CancellationToken;

/// One run's four cancellation handles, per §5 ("Cancellation").
///
/// `drain` doubles as the one-shot "drain-cancel signal" of §3/§4.7: the
/// finalizer races it against its timer, and emergency-stop or worker-loss
/// cancel it to short-circuit the wait.
#[derive(Clone)]
pub struct RunCancelHandles {
    pub progression: CancellationToken,
    pub ramp: CancellationToken,
    pub stop_conditions: CancellationToken,
    pub drain: CancellationToken,
}

impl Default for RunCancelHandles {
    fn default() -> Self {
        Self {
            progression: CancellationToken::new(),
            ramp: CancellationToken::new(),
            stop_conditions: CancellationToken::new(),
            drain: CancellationToken::new(),
        }
    }
}

impl RunCancelHandles {
    /// Cancels progression, ramp, and the stop-condition evaluator — used
    /// whenever a run leaves a running state. Does not touch `drain`: that
    /// handle is armed only once the run is already `stopping`.
    pub fn cancel_running_tasks(&self) {
        self.progression.cancel();
        self.ramp.cancel();
        self.stop_conditions.cancel();
    }

    /// Replaces `drain` with a fresh token, for the finalizer's wait. Any
    /// earlier drain-cancel sender is now talking to a stale token, which
    /// is fine: by the time a new drain wait is armed the old one is done.
    pub fn rearm_drain(&mut self) {
        self.drain = CancellationToken::new();
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
