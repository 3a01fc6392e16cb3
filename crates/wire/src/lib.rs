// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drillctl-wire: the `event/v1` SSE framing and the `WorkerAssignment`
//! descriptor shape handed to the injected assignment sender (§6).

pub mod descriptor;
pub mod sse;

pub use descriptor::{WireOpMixEntry, WireSessionPolicy, WireTarget, WireWorkload, WorkerAssignment};
pub use sse::{frame, should_close_after};
