// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The report shape returned by the injected config validator (§6).
//!
//! The `Validator` trait itself lives in `drillctl-adapters`, which depends
//! on this crate; the report type lives here so [`crate::Error::Validation`]
//! can carry it without a reverse dependency.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn ok() -> Self {
        Self { ok: true, errors: Vec::new(), warnings: Vec::new() }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self { ok: false, errors, warnings: Vec::new() }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation {}: {} error(s)", if self.ok { "ok" } else { "failed" }, self.errors.len())
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
