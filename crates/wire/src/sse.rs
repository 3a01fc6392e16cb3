// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSE framing for `RunEvent`s, per §6: `event: run_event\ndata: <JSON>\nid:
//! <event_id>\n\n`, with the stream auto-closing after a terminal
//! `STATE_TRANSITION`.

use drillctl_core::RunEvent;

/// Frames `event` as a single SSE message. Returns `Err` only if the event
/// fails to serialize, which should not happen for a well-formed
/// `RunEvent`.
pub fn frame(event: &RunEvent) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string(event)?;
    Ok(format!("event: run_event\ndata: {data}\nid: {}\n\n", event.event_id))
}

/// Whether the stream serving `event` should close after sending it.
pub fn should_close_after(event: &RunEvent) -> bool {
    event.is_terminal_transition()
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
