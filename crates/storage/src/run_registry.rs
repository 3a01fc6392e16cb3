// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run registry (§4.7): owns the `run_id -> RunRecord` map and each run's
//! event log behind a single reader-writer lock, per §5's "Shared-resource
//! policy" ("a single lock serializes state mutations").

use crate::EventLog;
use drillctl_core::{Error, Result, RunRecord};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

struct RunEntry {
    record: RunRecord,
    events: Arc<EventLog>,
}

/// Holds every known run's record and event log. All mutation goes through
/// [`RunRegistry::with_run_mut`] so readers never observe a half-applied
/// transition.
#[derive(Default)]
pub struct RunRegistry {
    runs: RwLock<HashMap<String, RunEntry>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new run. Errors if `run_id` is already present.
    pub fn create_run(&self, record: RunRecord, max_events: usize) -> Result<()> {
        let run_id = record.run_id.as_str().to_string();
        let mut runs = self.runs.write();
        if runs.contains_key(&run_id) {
            return Err(Error::internal("run_id already registered"));
        }
        runs.insert(run_id, RunEntry { record, events: Arc::new(EventLog::new(max_events)) });
        Ok(())
    }

    /// Defensive copy of the current record.
    pub fn get_run(&self, run_id: &str) -> Option<RunRecord> {
        self.runs.read().get(run_id).map(|e| e.record.clone())
    }

    pub fn list_runs(&self) -> Vec<RunRecord> {
        self.runs.read().values().map(|e| e.record.clone()).collect()
    }

    /// Shared handle to a run's event log; cheap to clone and outlives the
    /// registry lock, so callers can append/tail without holding it.
    pub fn event_log(&self, run_id: &str) -> Option<Arc<EventLog>> {
        self.runs.read().get(run_id).map(|e| e.events.clone())
    }

    /// Applies `f` to the run's record under the write lock, returning
    /// whatever `f` returns. The canonical way to perform a state
    /// transition: no intermediate state is ever visible to a reader.
    pub fn with_run_mut<T>(&self, run_id: &str, f: impl FnOnce(&mut RunRecord) -> Result<T>) -> Result<T> {
        let mut runs = self.runs.write();
        let entry = runs.get_mut(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        f(&mut entry.record)
    }

    /// Removes a run and its event log entirely. Used only by tests and
    /// administrative cleanup; the orchestrator itself never deletes a
    /// finished run's record.
    pub fn remove_run(&self, run_id: &str) -> bool {
        self.runs.write().remove(run_id).is_some()
    }
}

#[cfg(test)]
#[path = "run_registry_tests.rs"]
mod tests;
