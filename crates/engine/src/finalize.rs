// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The finalizer (§4.7): drains, then either falls back to `completed`
//! with `no_telemetry` or runs analysis through `stopping` → `analyzing`
//! → a terminal state.

use crate::orchestrator::Orchestrator;
use drillctl_core::{Actor, Clock, EventType, RunState};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const EMERGENCY_HOLD: Duration = Duration::from_secs(5);

impl<C: Clock + 'static> Orchestrator<C> {
    pub(crate) fn spawn_finalizer(&self, run_id: String, drain_timeout_ms: u64, actor: String, drain_token: CancellationToken) {
        let orch = self.arc();
        tokio::spawn(async move { orch.finalize_run(run_id, drain_timeout_ms, actor, drain_token).await });
    }

    async fn finalize_run(&self, run_id: String, drain_timeout_ms: u64, actor: String, drain_token: CancellationToken) {
        if drain_timeout_ms > 0 {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(drain_timeout_ms)) => {}
                _ = drain_token.cancelled() => {
                    let immediate = self.runs.get_run(&run_id).map(|r| r.immediate_stop).unwrap_or(false);
                    if immediate {
                        tokio::time::sleep(EMERGENCY_HOLD).await;
                    }
                }
            }
        }

        let Some(record) = self.runs.get_run(&run_id) else { return };
        if record.state != RunState::Stopping {
            return;
        }

        if !self.collaborators.analysis_wired() {
            let now = self.now_ms();
            if self.runs.with_run_mut(&run_id, |r| r.transition(RunState::Completed, now)).is_ok() {
                let _ = self.append(
                    &run_id,
                    crate::events::state_transition(&run_id, record.execution_id.as_str(), Actor::System, "stopping", "completed", "no_telemetry"),
                );
            }
            tracing::info!(run_id = %run_id, actor = %actor, "run completed without telemetry");
            return;
        }

        if let Err(err) = self.run_analysis(&run_id).await {
            tracing::warn!(run_id = %run_id, error = %err, "analysis failed");
            let _ = self.fail_run(&run_id, "analysis_failed");
        }
    }

    async fn run_analysis(&self, run_id: &str) -> drillctl_core::Result<()> {
        let execution_id = self.transition_to_analyzing(run_id)?;

        let telemetry = self.collaborators.telemetry.as_ref().expect("analysis_wired guarantees telemetry");
        let artifacts = self.collaborators.artifact_store.as_ref().expect("analysis_wired guarantees artifact_store");

        self.append(
            run_id,
            crate::events::build(
                run_id,
                &execution_id,
                EventType::AnalysisStarted,
                Actor::Analysis,
                Default::default(),
                serde_json::json!({}),
                vec![],
            ),
        )?;

        let data = telemetry.get_telemetry_data(run_id).await.map_err(drillctl_core::Error::from)?;

        let mut aggregator = match &self.collaborators.aggregator_factory {
            Some(factory) => factory(),
            None => return self.fail_run(run_id, "no_aggregator"),
        };
        aggregator.set_time_range(data.start_time_ms, data.end_time_ms);
        for op in &data.operations {
            aggregator.add_operation(op);
        }
        let metrics = aggregator.compute();

        let report = drillctl_adapters::types::Report {
            run_id: run_id.to_string(),
            scenario_id: data.scenario_id.clone(),
            metrics,
            stop_reason: data.stop_reason.clone(),
        };

        self.append(
            run_id,
            crate::events::build(
                run_id,
                &execution_id,
                EventType::AnalysisCompleted,
                Actor::Analysis,
                Default::default(),
                serde_json::to_value(&report.metrics).unwrap_or_default(),
                vec![],
            ),
        )?;

        let mut artifact_evidence = Vec::new();
        if let Some(reporter) = &self.collaborators.reporter {
            let json_bytes = reporter.generate_json(&report);
            let json_ref = artifacts.save_artifact(run_id, "report", "report.json", &json_bytes).await.map_err(drillctl_core::Error::from)?;
            artifact_evidence.push(drillctl_core::Evidence::new("artifact", json_ref.path.clone()));
            self.append(
                run_id,
                crate::events::build(
                    run_id,
                    &execution_id,
                    EventType::ArtifactStored,
                    Actor::Analysis,
                    Default::default(),
                    serde_json::to_value(&json_ref).unwrap_or_default(),
                    vec![],
                ),
            )?;

            let html_bytes = reporter.generate_html(&report);
            let html_ref = artifacts.save_artifact(run_id, "report", "report.html", &html_bytes).await.map_err(drillctl_core::Error::from)?;
            artifact_evidence.push(drillctl_core::Evidence::new("artifact", html_ref.path.clone()));
            self.append(
                run_id,
                crate::events::build(
                    run_id,
                    &execution_id,
                    EventType::ArtifactStored,
                    Actor::Analysis,
                    Default::default(),
                    serde_json::to_value(&html_ref).unwrap_or_default(),
                    vec![],
                ),
            )?;

            self.append(
                run_id,
                crate::events::build(
                    run_id,
                    &execution_id,
                    EventType::ReportGenerated,
                    Actor::Analysis,
                    Default::default(),
                    serde_json::json!({}),
                    artifact_evidence,
                ),
            )?;
        }

        let now = self.now_ms();
        self.runs.with_run_mut(run_id, |r| r.transition(RunState::Completed, now))?;
        self.append(run_id, crate::events::state_transition(run_id, &execution_id, Actor::Analysis, "analyzing", "completed", "analysis_complete"))
    }
}

#[cfg(test)]
#[path = "finalize_tests.rs"]
mod tests;
