// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock PDF renderer and uploader.

use std::sync::Mutex;

use async_trait::async_trait;
use shirokuma_core::types::{RenderedReport, ReportDocument};
use shirokuma_core::{AdapterType, PluginAdapter, ReportRenderer, ReportUploader, ShirokumaError};

/// Base of the URLs returned by [`MockReport`] uploads.
pub const MOCK_REPORT_BASE: &str = "https://reports.mock.test/";

/// Renders documents into fake PDF bytes and "uploads" them to
/// [`MOCK_REPORT_BASE`].
#[derive(Default)]
pub struct MockReport {
    documents: Mutex<Vec<ReportDocument>>,
    uploads: Mutex<Vec<String>>,
    fail_upload: bool,
}

impl MockReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload fails with an `Upload` error.
    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn documents(&self) -> Vec<ReportDocument> {
        self.documents.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// File names that were uploaded.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PluginAdapter for MockReport {
    fn name(&self) -> &str {
        "mock-report"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Renderer
    }
}

impl ReportRenderer for MockReport {
    fn render(&self, document: &ReportDocument) -> Result<RenderedReport, ShirokumaError> {
        if let Ok(mut docs) = self.documents.lock() {
            docs.push(document.clone());
        }
        Ok(RenderedReport {
            file_name: document.file_name.clone(),
            bytes: format!("%PDF-1.3 {}", document.title).into_bytes(),
        })
    }
}

#[async_trait]
impl ReportUploader for MockReport {
    async fn upload(&self, report: &RenderedReport) -> Result<String, ShirokumaError> {
        if self.fail_upload {
            return Err(ShirokumaError::Upload {
                message: "mock upload rejected".into(),
                source: None,
            });
        }
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(report.file_name.clone());
        }
        Ok(format!("{MOCK_REPORT_BASE}{}", report.file_name))
    }
}
