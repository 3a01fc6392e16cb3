// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Validator.validate`, per §6.

use async_trait::async_trait;
use drillctl_core::ValidationReport;

/// External config-schema validator. Consumed as a narrow contract; the
/// actual schema logic lives outside this workspace.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, config_bytes: &[u8]) -> ValidationReport;
}
