// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projects raw config bytes into a [`RunConfig`], per §4.3.

use crate::error::Result;
use crate::types::{OpMixEntry, RunConfig};

/// Normalizes an operation name to canonical slash form, e.g.
/// `tools_list` → `tools/list`. Names already containing a slash pass
/// through unchanged.
pub fn normalize_operation(op: &str) -> String {
    if op.contains('/') {
        return op.to_string();
    }
    match op.find('_') {
        Some(idx) => format!("{}/{}", &op[..idx], &op[idx + 1..]),
        None => op.to_string(),
    }
}

/// Parses `config_bytes` and projects it into the typed view the
/// orchestrator consumes: operation names are normalized, and a bare
/// `tools/call` entry with no `tool_name` is expanded into one entry per
/// configured template.
pub fn project(config_bytes: &[u8]) -> Result<RunConfig> {
    let mut config: RunConfig = serde_json::from_slice(config_bytes)?;

    for entry in config.workload.op_mix.iter_mut() {
        entry.operation = normalize_operation(&entry.operation);
    }

    if let Some(idx) = config
        .workload
        .op_mix
        .iter()
        .position(|e| e.operation == "tools/call" && e.tool_name.is_none())
    {
        let template_entry = config.workload.op_mix.remove(idx);
        let expanded: Vec<OpMixEntry> = config
            .tools
            .templates
            .iter()
            .map(|t| OpMixEntry {
                operation: template_entry.operation.clone(),
                weight: t.weight,
                tool_name: Some(t.name.clone()),
                arguments: t.arguments.clone(),
                uri: None,
                prompt_name: None,
            })
            .collect();
        config.workload.op_mix.splice(idx..idx, expanded);
    }

    Ok(config)
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
