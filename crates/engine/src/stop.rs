// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RequestStop` and `EmergencyStop` (§4.7), and the internal
//! `RequestStopWithReason` every background driver uses to trigger a stop
//! with a non-`user` actor.

use crate::orchestrator::Orchestrator;
use drillctl_core::{Actor, Clock, Error, Result, RunState, StopMode, StopReason};

impl<C: Clock + 'static> Orchestrator<C> {
    pub async fn request_stop(&self, run_id: &str, mode: StopMode, actor: &str) -> Result<()> {
        self.do_request_stop(run_id, mode, Actor::User, actor, "stop_requested").await
    }

    /// Used by background drivers (progression, the stop-condition
    /// evaluator) to request a stop attributed to a non-`user` actor.
    pub(crate) async fn request_stop_with_reason(&self, run_id: &str, mode: StopMode, actor: Actor, reason: &str) -> Result<()> {
        self.do_request_stop(run_id, mode, actor, actor.to_string().as_str(), reason).await
    }

    async fn do_request_stop(&self, run_id: &str, mode: StopMode, actor: Actor, actor_str: &str, reason: &str) -> Result<()> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        if record.is_terminal() {
            return Err(Error::TerminalState(record.state.to_string()));
        }

        if record.state == RunState::Stopping {
            self.append(
                run_id,
                crate::events::decision(run_id, record.execution_id.as_str(), actor, "stop_trigger_ignored", serde_json::json!({})),
            )?;
            return Ok(());
        }

        self.cancel_running_tasks_for(run_id);
        let now = self.now_ms();
        let from = record.state.to_string();
        let drain_timeout_ms = self.project_config(&record).ok().map(|c| c.safety.stop_policy.drain_timeout_ms).unwrap_or(30_000);

        self.runs.with_run_mut(run_id, |r| {
            r.transition(RunState::Stopping, now)?;
            r.stop_reason = Some(StopReason { mode, reason: reason.to_string(), actor: actor_str.to_string(), at_ms: now });
            Ok(())
        })?;

        self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                drillctl_core::EventType::StopRequested,
                actor,
                Default::default(),
                serde_json::json!({ "mode": mode.to_string(), "reason": reason, "actor": actor_str }),
                vec![],
            ),
        )?;
        self.append(run_id, crate::events::state_transition(run_id, record.execution_id.as_str(), actor, &from, "stopping", reason))?;

        if let Some(telemetry) = &self.collaborators.telemetry {
            let _ = telemetry.set_run_metadata(run_id, &record.scenario_id, Some(reason)).await;
        }

        let drain_timeout_ms = if mode == StopMode::Immediate { 0 } else { drain_timeout_ms };
        let drain_token = self.rearm_drain_for(run_id);
        self.spawn_finalizer(run_id.to_string(), drain_timeout_ms, actor_str.to_string(), drain_token);
        Ok(())
    }

    pub async fn emergency_stop(&self, run_id: &str, actor: &str) -> Result<()> {
        let record = self.runs.get_run(run_id).ok_or_else(|| Error::NotFound(run_id.to_string()))?;
        if record.is_terminal() {
            return Err(Error::TerminalState(record.state.to_string()));
        }

        if record.state == RunState::Stopping {
            let now = self.now_ms();
            self.runs.with_run_mut(run_id, |r| {
                r.stop_reason =
                    Some(StopReason { mode: StopMode::Immediate, reason: "emergency_stop".to_string(), actor: actor.to_string(), at_ms: now });
                r.immediate_stop = true;
                Ok(())
            })?;
            self.append(
                run_id,
                crate::events::decision(
                    run_id,
                    record.execution_id.as_str(),
                    Actor::User,
                    "stop_trigger_resolution",
                    serde_json::json!({ "escalated": true, "actor": actor }),
                ),
            )?;
            self.cancel_drain_for(run_id);
            return Ok(());
        }

        self.cancel_running_tasks_for(run_id);
        let now = self.now_ms();
        let from = record.state.to_string();
        self.runs.with_run_mut(run_id, |r| {
            r.transition(RunState::Stopping, now)?;
            r.immediate_stop = true;
            r.stop_reason = Some(StopReason { mode: StopMode::Immediate, reason: "emergency_stop".to_string(), actor: actor.to_string(), at_ms: now });
            Ok(())
        })?;

        self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                drillctl_core::EventType::EmergencyStop,
                Actor::User,
                Default::default(),
                serde_json::json!({ "actor": actor }),
                vec![],
            ),
        )?;
        self.append(run_id, crate::events::state_transition(run_id, record.execution_id.as_str(), Actor::User, &from, "stopping", "emergency_stop"))?;

        if let Some(telemetry) = &self.collaborators.telemetry {
            let _ = telemetry.set_run_metadata(run_id, &record.scenario_id, Some("emergency_stop")).await;
        }

        let drain_token = self.rearm_drain_for(run_id);
        self.spawn_finalizer(run_id.to_string(), 0, actor.to_string(), drain_token);
        Ok(())
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
