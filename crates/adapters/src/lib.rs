// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drillctl-adapters: the collaborator contracts of §6 (`Validator`,
//! `AssignmentSender`, `TelemetryStore`, `ArtifactStore`, `Aggregator`,
//! `Reporter`) as traits, plus `test-support`-gated fakes used by the
//! engine's own test suite.

pub mod analysis;
pub mod artifact;
pub mod assignment_sender;
pub mod error;
pub mod telemetry;
pub mod types;
pub mod validator;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use analysis::{Aggregator, Reporter};
pub use artifact::ArtifactStore;
pub use assignment_sender::AssignmentSender;
pub use error::{AdapterError, Result};
pub use telemetry::TelemetryStore;
pub use types::{ArtifactRef, Metrics, OperationRecord, Report, StreamingMetrics, TelemetryData};
pub use validator::Validator;

#[cfg(any(test, feature = "test-support"))]
pub use fakes::{FakeAggregator, FakeArtifactStore, FakeAssignmentSender, FakeReporter, FakeTelemetryStore, FakeValidator};
