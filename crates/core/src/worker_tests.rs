// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn cap() -> Capacity {
    Capacity { max_vus: 100, max_concurrent_ops: 50, max_rps: 1000 }
}

#[test]
fn new_worker_starts_with_no_health() {
    let w = WorkerInfo::new("w1", "host-a", cap(), 1_000);
    assert!(w.health.is_none());
    assert_eq!(w.last_heartbeat_ms, 1_000);
}

#[test]
fn heartbeat_staleness_respects_timeout() {
    let w = WorkerInfo::new("w1", "host-a", cap(), 1_000);
    assert!(!w.is_heartbeat_stale(1_400, 500));
    assert!(w.is_heartbeat_stale(1_500, 500));
}
