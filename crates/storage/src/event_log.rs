// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run append-only event log (C2).

use drillctl_core::{Error, EventId, Result, RunEvent};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Unbounded capacity sentinel.
pub const UNBOUNDED: usize = 0;

/// Default capacity per §3 ("EventLog").
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Append-only per-run log with a bounded capacity and cursor-based
/// tailing. Writers are serialized with an exclusive lock; readers take a
/// shared lock, per §4.2's concurrency note.
pub struct EventLog {
    max_events: usize,
    events: RwLock<Vec<RunEvent>>,
    truncated: AtomicBool,
    truncation_warned: AtomicBool,
}

impl EventLog {
    pub fn new(max_events: usize) -> Self {
        Self {
            max_events,
            events: RwLock::new(Vec::new()),
            truncated: AtomicBool::new(false),
            truncation_warned: AtomicBool::new(false),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_MAX_EVENTS)
    }

    /// Append `event`, filling in `schema_version`/`ts_ms`/`event_id` as
    /// needed. Silently drops the event once at capacity, setting the
    /// truncated flag; logs a warning the first time this happens.
    pub fn append(&self, mut event: RunEvent) -> Result<()> {
        if event.run_id.as_str().is_empty() || event.execution_id.as_str().is_empty() {
            return Err(Error::internal("event missing run_id/execution_id"));
        }
        if event.schema_version.is_empty() {
            event.schema_version = "event/v1".to_string();
        }
        if event.ts_ms == 0 {
            event.ts_ms = now_ms();
        }
        if event.event_id.as_str().is_empty() {
            event.event_id = EventId::generate(event.ts_ms);
        }

        let mut events = self.events.write();
        if self.max_events != UNBOUNDED && events.len() >= self.max_events {
            self.truncated.store(true, Ordering::Relaxed);
            if !self.truncation_warned.swap(true, Ordering::Relaxed) {
                tracing::warn!(
                    run_id = %event.run_id,
                    max_events = self.max_events,
                    "event log at capacity, dropping further events"
                );
            }
            return Ok(());
        }
        events.push(event);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated.load(Ordering::Relaxed)
    }

    /// Defensive copy of `events[cursor : min(cursor+limit, len)]`.
    pub fn tail(&self, cursor: i64, limit: i64) -> Result<Vec<RunEvent>> {
        if cursor < 0 {
            return Err(Error::internal("tail cursor must be non-negative"));
        }
        if limit < 0 {
            return Err(Error::internal("tail limit must be non-negative"));
        }
        let events = self.events.read();
        let cursor = cursor as usize;
        if cursor >= events.len() {
            return Ok(Vec::new());
        }
        let end = cursor.saturating_add(limit as usize).min(events.len());
        Ok(events[cursor..end].to_vec())
    }

    /// O(n) scan for the position of `event_id`.
    pub fn find_event_index(&self, event_id: &str) -> Option<usize> {
        self.events.read().iter().position(|e| e.event_id.as_str() == event_id)
    }

    /// The last event matching `event_type`, if any — used by the
    /// orchestrator to verify invariant (e) ("the last STATE_TRANSITION
    /// event's to_state equals the current state").
    pub fn last_of_type(&self, event_type: drillctl_core::EventType) -> Option<RunEvent> {
        self.events.read().iter().rev().find(|e| e.event_type == event_type).cloned()
    }
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod tests;
