// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop-condition evaluator (C9): classic metric conditions polled every
//! 5 s, plus an optional streaming-metrics family, armed for every
//! running stage except preflight.

use crate::orchestrator::Orchestrator;
use drillctl_config::{Stage, StopCondition};
use drillctl_core::{Actor, Clock, Evidence, EventType, StopMode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((p / 100.0) * (sorted.len() as f64 - 1.0)).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn evaluate_metric(metric: &str, ops: &[drillctl_adapters::types::OperationRecord]) -> Option<f64> {
    if ops.is_empty() {
        return Some(0.0);
    }
    match metric {
        "error_rate" => {
            let failed = ops.iter().filter(|o| !o.ok).count();
            Some(failed as f64 / ops.len() as f64)
        }
        "latency_p99_ms" | "latency_p95_ms" => {
            let mut latencies: Vec<f64> = ops.iter().map(|o| o.latency_ms).collect();
            latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let p = if metric == "latency_p99_ms" { 99.0 } else { 95.0 };
            Some(percentile(&latencies, p))
        }
        _ => None,
    }
}

impl<C: Clock + 'static> Orchestrator<C> {
    pub(crate) fn arm_stop_conditions(&self, run_id: String, stage: Stage) {
        let cancel = self.handles_for(&run_id).stop_conditions;
        let orch = self.arc();
        tokio::spawn(async move { orch.run_stop_conditions(run_id, stage, cancel).await });
    }

    async fn run_stop_conditions(&self, run_id: String, stage: Stage, cancel: CancellationToken) {
        let mut sustained = vec![0u32; stage.stop_conditions.len()];
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }

            let Some(telemetry) = self.collaborators.telemetry.clone() else { continue };
            let Ok(data) = telemetry.get_telemetry_data(&run_id).await else { continue };
            let now_ms = self.now_ms();

            for (idx, condition) in stage.stop_conditions.iter().enumerate() {
                let window: Vec<_> = data
                    .operations
                    .iter()
                    .filter(|o| now_ms.saturating_sub(o.ts_ms) <= condition.window_ms)
                    .cloned()
                    .collect();
                let Some(observed) = evaluate_metric(&condition.metric, &window) else { continue };

                if condition.comparator.compare(observed, condition.threshold) {
                    sustained[idx] += 1;
                } else {
                    sustained[idx] = 0;
                }

                if sustained[idx] >= condition.sustain_windows {
                    self.fire_stop_condition(&run_id, &stage, condition, observed, &window).await;
                    return;
                }
            }

            if let Some(streaming_condition) = &stage.streaming_stop_conditions {
                if let Some(metrics) = telemetry.get_streaming_metrics(&run_id).await {
                    let stalled = metrics.seconds_since_last_event >= streaming_condition.stream_stall_seconds;
                    let too_slow = metrics.events_per_second < streaming_condition.min_events_per_second;
                    if stalled || too_slow {
                        self.fire_streaming_stop_condition(&run_id, &stage, streaming_condition, &metrics).await;
                        return;
                    }
                }
            }
        }
    }

    async fn fire_stop_condition(
        &self,
        run_id: &str,
        stage: &Stage,
        condition: &StopCondition,
        observed: f64,
        window: &[drillctl_adapters::types::OperationRecord],
    ) {
        let Some(record) = self.runs.get_run(run_id) else { return };
        let failed_ops = window.iter().filter(|o| !o.ok).count();
        let latencies: Vec<f64> = {
            let mut v: Vec<f64> = window.iter().map(|o| o.latency_ms).collect();
            v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            v
        };

        let _ = self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                EventType::StopConditionTriggered,
                Actor::System,
                drillctl_core::Correlation { stage: Some(stage.stage.to_string()), stage_id: Some(stage.stage_id.clone()), ..Default::default() },
                serde_json::json!({
                    "condition_id": format!("{}:{}", stage.stage_id, condition.metric),
                    "metric": condition.metric,
                    "comparator": condition.comparator.to_string(),
                    "threshold": condition.threshold,
                    "observed": observed,
                    "window_ms": condition.window_ms,
                    "total_ops": window.len(),
                    "failed_ops": failed_ops,
                    "latency_p99": percentile(&latencies, 99.0),
                    "stage": stage.stage.to_string(),
                    "stage_id": stage.stage_id,
                }),
                vec![Evidence::new(
                    "metric",
                    format!("{}={} threshold={} window_ms={}", condition.metric, observed, condition.threshold, condition.window_ms),
                )],
            ),
        );

        if let Some(telemetry) = &self.collaborators.telemetry {
            let reason = format!(
                "stop_condition_triggered: {} {} {} (observed {})",
                condition.metric, condition.comparator, condition.threshold, observed
            );
            let _ = telemetry.set_run_metadata(run_id, &record.scenario_id, Some(&reason)).await;
            let _ = self.request_stop_with_reason(run_id, StopMode::Drain, Actor::System, &reason).await;
        }
    }

    async fn fire_streaming_stop_condition(
        &self,
        run_id: &str,
        stage: &Stage,
        condition: &drillctl_config::StreamingStopCondition,
        observed: &drillctl_adapters::types::StreamingMetrics,
    ) {
        let Some(record) = self.runs.get_run(run_id) else { return };
        let _ = self.append(
            run_id,
            crate::events::build(
                run_id,
                record.execution_id.as_str(),
                EventType::StopConditionTriggered,
                Actor::System,
                drillctl_core::Correlation { stage: Some(stage.stage.to_string()), stage_id: Some(stage.stage_id.clone()), ..Default::default() },
                serde_json::json!({
                    "condition_id": format!("{}:streaming", stage.stage_id),
                    "metric": "streaming",
                    "stream_stall_seconds": condition.stream_stall_seconds,
                    "min_events_per_second": condition.min_events_per_second,
                    "seconds_since_last_event": observed.seconds_since_last_event,
                    "events_per_second": observed.events_per_second,
                    "stage": stage.stage.to_string(),
                    "stage_id": stage.stage_id,
                }),
                vec![Evidence::new(
                    "metric",
                    format!("events_per_second={} seconds_since_last_event={}", observed.events_per_second, observed.seconds_since_last_event),
                )],
            ),
        );

        if let Some(telemetry) = &self.collaborators.telemetry {
            let reason = "stop_condition_triggered: streaming stall or low event rate".to_string();
            let _ = telemetry.set_run_metadata(run_id, &record.scenario_id, Some(&reason)).await;
            let _ = self.request_stop_with_reason(run_id, StopMode::Drain, Actor::System, &reason).await;
        }
    }
}

#[cfg(test)]
#[path = "stop_conditions_tests.rs"]
mod tests;
