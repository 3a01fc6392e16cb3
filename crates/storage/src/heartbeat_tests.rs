// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drillctl_core::{Capacity, FakeClock};
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingCallback {
    count: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl WorkerLostCallback for CountingCallback {
    async fn on_worker_lost(&self, _worker_id: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn sweep_evicts_stale_worker_and_invokes_callback() {
    let registry = Arc::new(WorkerRegistry::new());
    let clock = FakeClock::new();
    let cap = Capacity { max_vus: 10, max_concurrent_ops: 5, max_rps: 100 };
    registry.register("host-a", cap, clock.epoch_ms());

    let count = Arc::new(AtomicUsize::new(0));
    let callback = Arc::new(CountingCallback { count: count.clone() });
    let cancel = CancellationToken::new();
    let config = HeartbeatConfig {
        sweep_interval: Duration::from_millis(10),
        timeout: Duration::from_millis(50),
    };

    let sweep_clock = clock.clone();
    let sweep_registry = registry.clone();
    let sweep_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        run_heartbeat_sweep(sweep_registry, callback, config, sweep_clock, sweep_cancel).await;
    });

    clock.advance(Duration::from_millis(200));
    tokio::time::advance(Duration::from_millis(200)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(registry.list_workers().is_empty());
}
