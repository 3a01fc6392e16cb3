// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates `drillctl-config`'s internal `RunConfig` types into the wire
//! crate's on-the-wire `WorkerAssignment` shapes (§6). The two crates
//! deliberately don't share types — config is the orchestrator's internal
//! view, wire is what crosses the process boundary to a worker.

use drillctl_config::{SessionPolicy, Target, Workload};
use drillctl_wire::{WireOpMixEntry, WireSessionPolicy, WireTarget, WireWorkload};

pub fn target(t: &Target) -> WireTarget {
    WireTarget {
        url: t.url.clone(),
        transport: t.transport.clone(),
        headers: t.headers.clone(),
        redirect_policy: t.redirect_policy.clone(),
        auth: t.auth.clone(),
    }
}

pub fn workload(w: &Workload) -> WireWorkload {
    WireWorkload {
        op_mix: w
            .op_mix
            .iter()
            .map(|e| WireOpMixEntry {
                operation: e.operation.clone(),
                weight: e.weight,
                tool_name: e.tool_name.clone(),
                arguments: e.arguments.clone(),
                uri: e.uri.clone(),
                prompt_name: e.prompt_name.clone(),
            })
            .collect(),
    }
}

pub fn session_policy(s: &SessionPolicy) -> WireSessionPolicy {
    WireSessionPolicy {
        mode: s.mode.clone(),
        pool_size: s.pool_size,
        ttl_ms: s.ttl_ms,
        max_idle_ms: s.max_idle_ms,
    }
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
