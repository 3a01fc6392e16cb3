// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors a collaborator implementation can raise; always folded into
//! `drillctl_core::Error::Internal` at the orchestrator boundary (§7).

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("collaborator rejected the request: {0}")]
    Rejected(String),
}

impl From<AdapterError> for drillctl_core::Error {
    fn from(err: AdapterError) -> Self {
        drillctl_core::Error::internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
