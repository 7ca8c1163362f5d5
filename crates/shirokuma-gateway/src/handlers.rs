// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles POST /webhook, POST /webhook/form, GET / and GET /health.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shirokuma_agent::{EventTap, FormError, FormSubmission};
use shirokuma_line::WebhookBody;

use crate::server::GatewayState;

/// Request body for POST /webhook/form.
#[derive(Debug, Deserialize)]
pub struct FormRequest {
    pub line_user_id: String,
    pub birthdate: String,
    pub mbti: String,
    pub form_id: String,
}

/// Response body for GET / and GET /health.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// POST /webhook
///
/// Runs after signature verification. Answers `OK` once every event has
/// been forwarded and dispatched, whatever their individual outcome.
pub async fn post_webhook(State(state): State<GatewayState>, body: Bytes) -> Response {
    let webhook: WebhookBody = match serde_json::from_slice(&body) {
        Ok(webhook) => webhook,
        Err(e) => {
            tracing::warn!(error = %e, "webhook body is not valid JSON");
            return error(StatusCode::BAD_REQUEST, "invalid webhook body");
        }
    };

    tracing::debug!(events = webhook.events.len(), "webhook received");
    let tap = state.forwarder.as_deref().map(|f| f as &dyn EventTap);
    state.dispatcher.handle_batch(&webhook, tap).await;

    (StatusCode::OK, "OK").into_response()
}

/// POST /webhook/form
pub async fn post_form(State(state): State<GatewayState>, body: Bytes) -> Response {
    let form: FormRequest = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(e) => return error(StatusCode::BAD_REQUEST, format!("invalid form body: {e}")),
    };

    let submission = FormSubmission {
        line_user_id: form.line_user_id,
        birthdate: form.birthdate,
        mbti: form.mbti,
        form_id: form.form_id,
    };

    match state.dispatcher.handle_form(submission).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response(),
        Err(e @ (FormError::UnknownForm(_) | FormError::InvalidInput(_))) => {
            tracing::info!(error = %e, "form submission rejected");
            error(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(FormError::Failed(e)) => {
            tracing::error!(error = %e, "form processing failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, "processing failed")
        }
    }
}

/// GET / and GET /health
pub async fn get_status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        service: "shirokuma",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}
