// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ArtifactStore.save_artifact`, per §6.

use crate::error::Result;
use crate::types::ArtifactRef;
use async_trait::async_trait;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save_artifact(&self, run_id: &str, kind: &str, filename: &str, bytes: &[u8]) -> Result<ArtifactRef>;
}
