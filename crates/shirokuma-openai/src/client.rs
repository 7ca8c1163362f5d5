// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat-completions API.
//!
//! Provides [`OpenAiClient`] which handles request construction, bearer
//! authentication, and bounded retry of transient errors (429 and 5xx).

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use shirokuma_core::ShirokumaError;
use shirokuma_security::redact;
use tracing::{debug, warn};

use crate::retry::{RetryPolicy, is_retryable, retry_after};
use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// Path appended to the configured base URL.
const COMPLETIONS_PATH: &str = "/chat/completions";

/// How a successful call got there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryStats {
    /// Requests sent, including the successful one.
    pub attempts: u32,
    /// Delays slept before each retry, in order.
    pub delays: Vec<Duration>,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    policy: RetryPolicy,
}

impl OpenAiClient {
    /// Creates a client authenticated with `api_key`.
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self, ShirokumaError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ShirokumaError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ShirokumaError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}{COMPLETIONS_PATH}", base_url.trim_end_matches('/')),
            timeout,
            policy,
        })
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sends `request`, retrying 429 and 5xx responses per the retry policy.
    ///
    /// Exhausting the retries yields [`ShirokumaError::RateLimited`]; any
    /// other non-success status fails immediately.
    pub async fn complete_chat(
        &self,
        request: &ChatRequest,
    ) -> Result<(ChatResponse, RetryStats), ShirokumaError> {
        let mut stats = RetryStats::default();

        loop {
            stats.attempts += 1;
            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            debug!(status = %status, attempt = stats.attempts, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| self.transport_error(e))?;
                let parsed: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| ShirokumaError::Provider {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok((parsed, stats));
            }

            if is_retryable(status) {
                let retry_index = stats.attempts - 1;
                if retry_index >= self.policy.max_retries {
                    warn!(status = %status, attempts = stats.attempts, "completion retries exhausted");
                    return Err(ShirokumaError::RateLimited {
                        attempts: stats.attempts,
                    });
                }
                let delay = self.policy.delay(retry_index, retry_after(response.headers()));
                let body = response.text().await.unwrap_or_default();
                warn!(
                    status = %status,
                    delay_ms = delay.as_millis() as u64,
                    body = %redact(&body, &[]),
                    "transient error, will retry"
                );
                stats.delays.push(delay);
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(ShirokumaError::Provider {
                message: redact(&message, &[]),
                source: None,
            });
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ShirokumaError {
        if e.is_timeout() {
            ShirokumaError::Timeout {
                duration: self.timeout,
            }
        } else {
            ShirokumaError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}
