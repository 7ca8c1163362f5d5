// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort copy of each webhook event to a secondary endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use shirokuma_agent::EventTap;
use shirokuma_core::ShirokumaError;
use tracing::{debug, warn};

/// Posts events to a second webhook. Failures are logged and dropped.
#[derive(Debug, Clone)]
pub struct SecondaryForwarder {
    client: reqwest::Client,
    url: String,
}

impl SecondaryForwarder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ShirokumaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShirokumaError::Internal(format!("forward client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends `event` wrapped in a webhook body of its own.
    pub async fn forward(&self, destination: Option<&str>, event: &Value) {
        let body = json!({ "destination": destination, "events": [event] });
        match self.client.post(&self.url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(status = resp.status().as_u16(), "event forwarded");
            }
            Ok(resp) => {
                warn!(status = resp.status().as_u16(), "secondary webhook rejected event");
            }
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "secondary webhook unreachable");
            }
        }
    }
}

#[async_trait]
impl EventTap for SecondaryForwarder {
    async fn observe(&self, destination: Option<&str>, event: &Value) {
        self.forward(destination, event).await;
    }
}
