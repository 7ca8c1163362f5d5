// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The diagnosis pipeline: classify, prompt, complete, deliver.
//!
//! One implementation serves every [`DiagnosisType`]; the type only selects
//! the template and whether the result is delivered as text or as a PDF link.

use std::sync::Arc;

use shirokuma_core::types::{OutboundMessage, ReportDocument};
use shirokuma_core::{
    ClassificationResult, CompletionProvider, DiagnosisRequest, DiagnosisType, ReportRenderer,
    ReportUploader, ShirokumaError,
};
use shirokuma_fortune::Classifier;
use shirokuma_openai::is_refusal;
use shirokuma_prompt::{AssembledPrompt, TemplateSet, assemble, build_environment};
use tracing::{debug, info, warn};

use crate::messages;

/// Where PDF reports go.
#[derive(Clone)]
pub struct ReportSink {
    pub renderer: Arc<dyn ReportRenderer>,
    pub uploader: Arc<dyn ReportUploader>,
    /// Document title prefix.
    pub title: String,
}

/// The result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Text(String),
    Report { url: String },
}

impl Delivery {
    pub fn into_messages(self, diagnosis: DiagnosisType) -> Vec<OutboundMessage> {
        match self {
            Delivery::Text(text) => vec![OutboundMessage::Text(text)],
            Delivery::Report { url } => {
                vec![OutboundMessage::Text(messages::report_ready(diagnosis, &url))]
            }
        }
    }
}

pub struct DiagnosisPipeline {
    classifier: Arc<Classifier>,
    templates: Arc<TemplateSet>,
    provider: Arc<dyn CompletionProvider>,
    report: Option<ReportSink>,
}

impl DiagnosisPipeline {
    pub fn new(
        classifier: Arc<Classifier>,
        templates: Arc<TemplateSet>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            classifier,
            templates,
            provider,
            report: None,
        }
    }

    /// Enables PDF delivery for the types that use it.
    pub fn with_report(mut self, sink: ReportSink) -> Self {
        self.report = Some(sink);
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn delivers_reports(&self) -> bool {
        self.report.is_some()
    }

    /// Classifies the requester and, when present, the partner. Fails with
    /// `Classification` when either date resolves to nothing.
    pub fn classify(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<(ClassificationResult, Option<ClassificationResult>), ShirokumaError> {
        let own = self.classifier.classify_resolved(&request.birth_date)?;
        let partner = request
            .partner
            .as_ref()
            .map(|p| self.classifier.classify_resolved(&p.birth_date))
            .transpose()?;
        Ok((own, partner))
    }

    /// Classifies both people and renders the type's template.
    pub fn prepare(
        &self,
        request: &DiagnosisRequest,
        user_name: Option<&str>,
    ) -> Result<AssembledPrompt, ShirokumaError> {
        let (own, partner) = self.classify(request)?;
        let template = self.templates.get(request.diagnosis_type)?;
        let env = build_environment(request, &own, partner.as_ref(), user_name);
        Ok(assemble(template, &env))
    }

    /// Runs the completion, retrying once under the safer system prompt
    /// when the first answer is a refusal.
    pub async fn complete(&self, prompt: &AssembledPrompt) -> Result<String, ShirokumaError> {
        let first = self.provider.complete(prompt.request()).await?;
        if !is_refusal(&first.content) {
            return Ok(first.content);
        }

        warn!(response_id = %first.id, "completion refused, retrying with safer prompt");
        let second = self.provider.complete(prompt.safer_request()).await?;
        if is_refusal(&second.content) {
            return Err(ShirokumaError::Refused);
        }
        Ok(second.content)
    }

    /// Produces the deliverable for `request` on behalf of `user_id`.
    pub async fn run(
        &self,
        request: &DiagnosisRequest,
        user_name: Option<&str>,
        user_id: &str,
    ) -> Result<Delivery, ShirokumaError> {
        let prompt = self.prepare(request, user_name)?;
        debug!(
            diagnosis = %request.diagnosis_type,
            prompt_chars = prompt.user.chars().count(),
            "prompt assembled"
        );

        let text = self.complete(&prompt).await?;
        let body = with_closing(&text, &prompt.closing);

        let sink = match &self.report {
            Some(sink) if request.diagnosis_type.delivers_pdf() => sink,
            _ => return Ok(Delivery::Text(body)),
        };

        let document = ReportDocument {
            title: format!("{} {}", sink.title, request.diagnosis_type.label()),
            summary: prompt.summary.unwrap_or_default(),
            body,
            file_name: shirokuma_report::report_file_name(
                request.diagnosis_type.slug(),
                user_id,
                chrono::Utc::now().timestamp(),
            ),
        };

        let renderer = Arc::clone(&sink.renderer);
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|e| ShirokumaError::Internal(format!("report render task failed: {e}")))??;

        let url = sink.uploader.upload(&rendered).await?;
        info!(file = %rendered.file_name, bytes = rendered.bytes.len(), "report uploaded");
        Ok(Delivery::Report { url })
    }
}

fn with_closing(text: &str, closing: &str) -> String {
    let text = text.trim();
    if closing.is_empty() {
        text.to_string()
    } else {
        format!("{text}\n\n{closing}")
    }
}
