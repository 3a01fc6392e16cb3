// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drillctl-storage: the mutable state behind a running drill — the
//! per-run event log (C2), the worker registry and heartbeat sweep (C4),
//! the VU allocator (C5), the lease manager (C6), and the run registry
//! that ties a run's record and event log together under one lock (§4.7).
//!
//! This crate holds no collaborator traits (validators, telemetry stores,
//! assignment senders — see `drillctl-adapters`) and no orchestration
//! logic (stage progression, stop conditions, worker-failure policy — see
//! `drillctl-engine`). It is the storage layer those depend on.

pub mod allocator;
pub mod event_log;
pub mod heartbeat;
pub mod lease_manager;
pub mod run_registry;
pub mod worker_registry;

pub use allocator::{allocate, reallocate, AllocationResult, WorkerCapacity};
pub use event_log::{EventLog, DEFAULT_MAX_EVENTS, UNBOUNDED};
pub use heartbeat::{run_heartbeat_sweep, HeartbeatConfig, WorkerLostCallback};
pub use lease_manager::LeaseManager;
pub use run_registry::RunRegistry;
pub use worker_registry::WorkerRegistry;
