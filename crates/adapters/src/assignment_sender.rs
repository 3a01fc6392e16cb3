// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AssignmentSender.add_assignment`, per §6.

use crate::error::Result;
use async_trait::async_trait;
use drillctl_wire::WorkerAssignment;

/// Delivers a `WorkerAssignment` to a worker. The network edge that talks
/// to workers lives outside this workspace (§1); the core only emits
/// descriptors through this trait.
#[async_trait]
pub trait AssignmentSender: Send + Sync {
    async fn add_assignment(&self, worker_id: &str, assignment: WorkerAssignment) -> Result<()>;
}
