// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event flow for webhook deliveries and form submissions.
//!
//! A chat event is parsed, validated, deduplicated, queued behind the
//! user's earlier jobs and acknowledged inside the webhook request. The
//! diagnosis itself runs on a tracked task that waits for its turn and
//! delivers by push. Every failure past the acknowledgment is converted
//! into a push message for the user.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use shirokuma_core::types::OutboundMessage;
use shirokuma_core::{
    BirthDate, DiagnosisRequest, JobStore, JobTicket, Messenger, PersonalityCode, ShirokumaError,
    UserLocks,
};
use shirokuma_extract::extract_detailed;
use shirokuma_line::{TextEvent, WebhookBody, WebhookEvent, is_valid_user_id};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::messages;
use crate::pipeline::DiagnosisPipeline;

/// What happened to one webhook event inside the request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not a user text message.
    Ignored,
    /// The text did not contain a usable request; guidance was sent.
    Rejected,
    /// Same job seen inside the dedup window; dropped silently.
    Duplicate,
    /// Acknowledged and scheduled.
    Accepted,
}

/// A form-intake submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub line_user_id: String,
    /// `YYYY-MM-DD`.
    pub birthdate: String,
    pub mbti: String,
    pub form_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("unknown form id `{0}`")]
    UnknownForm(String),

    #[error("invalid submission: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Failed(#[from] ShirokumaError),
}

/// Sees each raw event of a batch before it is dispatched.
#[async_trait]
pub trait EventTap: Send + Sync {
    async fn observe(&self, destination: Option<&str>, event: &Value);
}

/// Routes inbound events into the diagnosis pipeline.
pub struct Dispatcher {
    pipeline: Arc<DiagnosisPipeline>,
    messenger: Arc<dyn Messenger>,
    jobs: Arc<dyn JobStore>,
    locks: Arc<dyn UserLocks>,
    tracker: TaskTracker,
}

impl Dispatcher {
    pub fn new(
        pipeline: Arc<DiagnosisPipeline>,
        messenger: Arc<dyn Messenger>,
        jobs: Arc<dyn JobStore>,
        locks: Arc<dyn UserLocks>,
    ) -> Self {
        Self {
            pipeline,
            messenger,
            jobs,
            locks,
            tracker: TaskTracker::new(),
        }
    }

    pub fn pipeline(&self) -> &DiagnosisPipeline {
        &self.pipeline
    }

    /// Number of diagnosis jobs still running or waiting for their user.
    pub fn pending_jobs(&self) -> usize {
        self.tracker.len()
    }

    /// Handles every event of a webhook body, one after another. `tap`
    /// sees each event first.
    pub async fn handle_batch(
        &self,
        body: &WebhookBody,
        tap: Option<&dyn EventTap>,
    ) -> Vec<EventOutcome> {
        let mut outcomes = Vec::with_capacity(body.events.len());
        for raw in &body.events {
            if let Some(tap) = tap {
                tap.observe(body.destination.as_deref(), raw).await;
            }
            let outcome = self.handle_event(raw).await;
            debug!(?outcome, "event handled");
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Handles one raw webhook event up to its acknowledgment.
    pub async fn handle_event(&self, raw: &Value) -> EventOutcome {
        let Some(event) = WebhookEvent::from_value(raw).into_text() else {
            debug!("ignoring non-text event");
            return EventOutcome::Ignored;
        };
        let TextEvent {
            reply_token,
            user_id,
            text,
            ..
        } = event;

        let request = match extract_detailed(&text) {
            Ok(request) => request,
            Err(failure) => {
                debug!(user_id = %user_id, reason = %failure, "message rejected");
                self.reply(&reply_token, messages::guidance(&failure)).await;
                return EventOutcome::Rejected;
            }
        };

        if let Err(e) = self.pipeline.classify(&request) {
            debug!(user_id = %user_id, error = %e, "birth date cannot be classified");
            self.reply(&reply_token, messages::UNRESOLVED_DATE).await;
            return EventOutcome::Rejected;
        }

        if !self.jobs.try_claim(&request.job_key(&user_id), Instant::now()) {
            info!(user_id = %user_id, diagnosis = %request.diagnosis_type, "duplicate request dropped");
            return EventOutcome::Duplicate;
        }

        let ticket = self.locks.reserve(&user_id);
        self.reply(&reply_token, messages::ACKNOWLEDGED).await;

        let job = self.job();
        self.tracker
            .spawn(async move { job.run(user_id, request, ticket).await });
        EventOutcome::Accepted
    }

    /// Runs a form submission to completion and pushes the result.
    pub async fn handle_form(&self, submission: FormSubmission) -> Result<(), FormError> {
        let (diagnosis_type, _) = self
            .pipeline
            .templates()
            .by_form_id(&submission.form_id)
            .ok_or_else(|| FormError::UnknownForm(submission.form_id.clone()))?;
        if diagnosis_type.requires_partner() {
            return Err(FormError::InvalidInput(format!(
                "form `{}` needs partner data the form does not carry",
                submission.form_id
            )));
        }
        if !is_valid_user_id(&submission.line_user_id) {
            return Err(FormError::InvalidInput(format!(
                "line_user_id `{}` is not a LINE user id",
                submission.line_user_id
            )));
        }
        let birth_date = BirthDate::parse_iso(submission.birthdate.trim()).ok_or_else(|| {
            FormError::InvalidInput(format!("birthdate `{}` is not YYYY-MM-DD", submission.birthdate))
        })?;
        let personality_code = PersonalityCode::parse(&submission.mbti).ok_or_else(|| {
            FormError::InvalidInput(format!("mbti `{}` is not a valid code", submission.mbti))
        })?;

        let request = DiagnosisRequest {
            diagnosis_type,
            birth_date,
            personality_code,
            gender: None,
            question: None,
            partner: None,
        };

        let ticket = self.locks.reserve(&submission.line_user_id);
        match self
            .job()
            .deliver(&submission.line_user_id, &request, ticket)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_user_error() => Err(FormError::InvalidInput(e.to_string())),
            Err(e) => Err(FormError::Failed(e)),
        }
    }

    /// Waits for every spawned job to finish.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    fn job(&self) -> Job {
        Job {
            pipeline: Arc::clone(&self.pipeline),
            messenger: Arc::clone(&self.messenger),
        }
    }

    async fn reply(&self, reply_token: &str, text: &str) {
        if let Err(e) = self
            .messenger
            .reply(reply_token, vec![OutboundMessage::text(text)])
            .await
        {
            warn!(error = %e, "reply failed");
        }
    }
}

/// Everything a spawned diagnosis needs.
struct Job {
    pipeline: Arc<DiagnosisPipeline>,
    messenger: Arc<dyn Messenger>,
}

impl Job {
    async fn run(self, user_id: String, request: DiagnosisRequest, ticket: JobTicket) {
        if let Err(e) = self.deliver(&user_id, &request, ticket).await {
            if e.is_user_error() {
                info!(user_id = %user_id, error = %e, "diagnosis not possible for input");
            } else {
                error!(user_id = %user_id, error = %e, "diagnosis failed");
            }
            let apology = vec![OutboundMessage::text(messages::failure_message(&e))];
            if let Err(push_err) = self.messenger.push(&user_id, apology).await {
                error!(user_id = %user_id, error = %push_err, "failure notice could not be delivered");
            }
        }
    }

    /// Waits for the user's turn, runs the pipeline and pushes the result.
    async fn deliver(
        &self,
        user_id: &str,
        request: &DiagnosisRequest,
        ticket: JobTicket,
    ) -> Result<(), ShirokumaError> {
        let _permit = ticket.ready().await;
        let started = Instant::now();

        let user_name = match self.messenger.profile(user_id).await {
            Ok(profile) if !profile.display_name.trim().is_empty() => Some(profile.display_name),
            Ok(_) => None,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "profile lookup failed, using default name");
                None
            }
        };

        let delivery = self
            .pipeline
            .run(request, user_name.as_deref(), user_id)
            .await?;
        self.messenger
            .push(user_id, delivery.into_messages(request.diagnosis_type))
            .await?;

        info!(
            user_id = %user_id,
            diagnosis = %request.diagnosis_type,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "diagnosis delivered"
        );
        Ok(())
    }
}
