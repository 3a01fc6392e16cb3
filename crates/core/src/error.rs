// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by every crate that touches `RunRecord` state.

use crate::ValidationReport;

/// Errors the core's public operations can return.
///
/// Variant names are kinds, not wrapped foreign types: collaborator errors
/// are always folded into [`Error::Internal`] with a message, never leaked
/// as a downstream type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("run not found: {0}")]
    NotFound(String),

    #[error("invalid state for operation: {0}")]
    InvalidState(String),

    #[error("transition not admitted: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("run is in a terminal state: {0}")]
    TerminalState(String),

    #[error("config bytes not available for run: {0}")]
    ConfigNotAvailable(String),

    #[error("config validation failed")]
    Validation(ValidationReport),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
