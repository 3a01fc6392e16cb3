// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drillctl-config: projects raw config bytes into the typed view the
//! orchestrator consumes (C3) — targets, stages, workload op-mix
//! normalization and template expansion, session policy, and safety caps.

pub mod error;
pub mod parse;
pub mod types;

pub use error::{ConfigError, Result};
pub use parse::{normalize_operation, project};
pub use types::{
    Comparator, HardCaps, Load, OpMixEntry, RunConfig, Safety, SessionPolicy, Stage, StageKind,
    StopCondition, StopPolicy, StreamingStopCondition, Target, ToolTemplate, Tools,
    WorkerFailurePolicy, Workload,
};
