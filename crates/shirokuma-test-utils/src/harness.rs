// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end dispatcher testing.
//!
//! `TestHarness` assembles a [`Dispatcher`] over the shipped lookup tables
//! and templates, with mock adapters at every external seam.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use shirokuma_agent::{
    DiagnosisPipeline, Dispatcher, EventOutcome, InMemoryJobStore, InMemoryUserLocks, ReportSink,
};
use shirokuma_core::ShirokumaError;
use shirokuma_fortune::{Classifier, Epochs, LookupTables};
use shirokuma_prompt::TemplateSet;

use crate::mock_messenger::MockMessenger;
use crate::mock_provider::MockProvider;
use crate::mock_report::MockReport;

/// Repository `assets/` directory.
pub fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets")
}

/// Builds a LINE text message event.
pub fn text_event(user_id: &str, reply_token: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": reply_token,
        "source": { "type": "user", "userId": user_id },
        "timestamp": 1_700_000_000_000u64,
        "message": { "type": "text", "id": format!("msg-{reply_token}"), "text": text }
    })
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    provider: Option<MockProvider>,
    messenger: Option<MockMessenger>,
    report: Option<MockReport>,
    tables: Option<LookupTables>,
    reports_enabled: bool,
    dedup_ttl: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            provider: None,
            messenger: None,
            report: None,
            tables: None,
            reports_enabled: true,
            dedup_ttl: Duration::from_secs(120),
        }
    }

    /// Set mock completion responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.provider = Some(MockProvider::with_responses(responses));
        self
    }

    pub fn with_provider(mut self, provider: MockProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_messenger(mut self, messenger: MockMessenger) -> Self {
        self.messenger = Some(messenger);
        self
    }

    pub fn with_report(mut self, report: MockReport) -> Self {
        self.report = Some(report);
        self
    }

    /// Classify against `tables` instead of the shipped ones.
    pub fn with_tables(mut self, tables: LookupTables) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Deliver every type as text.
    pub fn without_reports(mut self) -> Self {
        self.reports_enabled = false;
        self
    }

    pub fn with_dedup_ttl(mut self, ttl: Duration) -> Self {
        self.dedup_ttl = ttl;
        self
    }

    pub fn build(self) -> Result<TestHarness, ShirokumaError> {
        let assets = assets_dir();
        let tables = match self.tables {
            Some(tables) => tables,
            None => LookupTables::load(&assets.join("tables"))?,
        };
        let templates = TemplateSet::load(&assets.join("templates"))?;

        let provider = Arc::new(self.provider.unwrap_or_default());
        let messenger = Arc::new(self.messenger.unwrap_or_default());
        let report = Arc::new(self.report.unwrap_or_default());

        let mut pipeline = DiagnosisPipeline::new(
            Arc::new(Classifier::new(Epochs::default(), tables)),
            Arc::new(templates),
            provider.clone(),
        );
        if self.reports_enabled {
            pipeline = pipeline.with_report(ReportSink {
                renderer: report.clone(),
                uploader: report.clone(),
                title: "しろくま診断".to_string(),
            });
        }

        let dispatcher = Dispatcher::new(
            Arc::new(pipeline),
            messenger.clone(),
            Arc::new(InMemoryJobStore::new(self.dedup_ttl)),
            Arc::new(InMemoryUserLocks::new()),
        );

        Ok(TestHarness {
            dispatcher: Arc::new(dispatcher),
            provider,
            messenger,
            report,
        })
    }
}

/// A complete dispatcher with mock adapters.
pub struct TestHarness {
    pub dispatcher: Arc<Dispatcher>,
    pub provider: Arc<MockProvider>,
    pub messenger: Arc<MockMessenger>,
    pub report: Arc<MockReport>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Sends one text message from `user_id` and waits for its job.
    pub async fn send_text(&self, user_id: &str, text: &str) -> EventOutcome {
        let token = format!("token-{}", self.messenger.replies().len());
        let outcome = self
            .dispatcher
            .handle_event(&text_event(user_id, &token, text))
            .await;
        self.dispatcher.wait_idle().await;
        outcome
    }
}
