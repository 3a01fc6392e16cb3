// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Lease` type tracked by the lease manager (C6).

use crate::Assignment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseState {
    Active,
    Revoked,
}

crate::simple_display! {
    LeaseState {
        Active => "active",
        Revoked => "revoked",
    }
}

/// The revocable binding of an assignment to a worker, per §3 ("Lease").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub lease_id: String,
    pub worker_id: String,
    pub assignment: Assignment,
    pub issued_at_ms: u64,
    pub state: LeaseState,
}

impl Lease {
    pub fn new(lease_id: impl Into<String>, worker_id: impl Into<String>, assignment: Assignment, issued_at_ms: u64) -> Self {
        Self {
            lease_id: lease_id.into(),
            worker_id: worker_id.into(),
            assignment,
            issued_at_ms,
            state: LeaseState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == LeaseState::Active
    }

    pub fn revoke(&mut self) {
        self.state = LeaseState::Revoked;
    }

    /// Whether the lease has outlived `max_lifetime_ms`, measured from
    /// `issued_at_ms` against `now_ms`.
    pub fn has_expired(&self, now_ms: u64, max_lifetime_ms: u64) -> bool {
        now_ms.saturating_sub(self.issued_at_ms) >= max_lifetime_ms
    }
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
