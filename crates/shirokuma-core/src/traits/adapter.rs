// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all external-service adapters implement.

use async_trait::async_trait;

use crate::error::ShirokumaError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for Shirokuma adapters.
///
/// Provides identity and a health check used by the `/health` endpoint.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the role this adapter plays in the pipeline.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    ///
    /// Implementations must not spend API quota here.
    async fn health_check(&self) -> Result<HealthStatus, ShirokumaError> {
        Ok(HealthStatus::Healthy)
    }
}
