// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report rendering and upload traits.

use async_trait::async_trait;

use crate::error::ShirokumaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{RenderedReport, ReportDocument};

/// Renders a diagnosis report into a document format (PDF).
pub trait ReportRenderer: PluginAdapter {
    /// Renders the document. CPU-bound; callers may move it off the runtime.
    fn render(&self, document: &ReportDocument) -> Result<RenderedReport, ShirokumaError>;
}

/// Uploads rendered reports to object storage.
#[async_trait]
pub trait ReportUploader: PluginAdapter {
    /// Uploads the report and returns its public URL.
    async fn upload(&self, report: &RenderedReport) -> Result<String, ShirokumaError>;
}
