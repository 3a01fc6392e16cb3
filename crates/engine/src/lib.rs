// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drillctl-engine: the orchestrator (C7) that drives a run through its
//! lifecycle — stage progression and auto-ramp (C8), the stop-condition
//! evaluator (C9), and the worker-failure handler (C10) — on top of the
//! state machine, event log, allocator, and lease manager in
//! `drillctl-core`/`drillctl-storage`, against the collaborator contracts
//! in `drillctl-adapters`.

mod cancel;
mod collaborators;
mod dispatch;
mod events;
mod finalize;
mod heartbeat_bridge;
mod mapping;
mod orchestrator;
mod progression;
mod stage_transitions;
mod start;
mod stop;
mod stop_conditions;
#[cfg(test)]
mod testkit;
mod worker_failure;

pub use cancel::RunCancelHandles;
pub use collaborators::{AggregatorFactory, Collaborators};
pub use drillctl_core::{Error, Result};
pub use heartbeat_bridge::OrchestratorWorkerLostCallback;
pub use orchestrator::Orchestrator;
