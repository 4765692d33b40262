// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and lifecycle shared by every adapter.

use async_trait::async_trait;

use crate::error::MnemeError;
use crate::types::{AdapterType, HealthStatus};

/// Supertrait of [`StorageAdapter`](super::StorageAdapter),
/// [`EmbeddingAdapter`](super::EmbeddingAdapter) and
/// [`GenerationAdapter`](super::GenerationAdapter).
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Name used in log fields.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    async fn health_check(&self) -> Result<HealthStatus, MnemeError>;

    /// Release connections or handles. Calls after this may fail.
    async fn shutdown(&self) -> Result<(), MnemeError>;
}
