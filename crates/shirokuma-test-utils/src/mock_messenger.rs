// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging platform that records what would have been sent.

use std::sync::Mutex;

use async_trait::async_trait;
use shirokuma_core::types::{OutboundMessage, UserProfile};
use shirokuma_core::{AdapterType, Messenger, PluginAdapter, ShirokumaError};

/// One recorded reply or push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    /// Reply token for replies, user id for pushes.
    pub target: String,
    pub texts: Vec<String>,
}

/// Records replies and pushes; answers profile lookups with a fixed name.
pub struct MockMessenger {
    replies: Mutex<Vec<Sent>>,
    pushes: Mutex<Vec<Sent>>,
    display_name: Option<String>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::with_display_name(Some("テストユーザー"))
    }

    /// `None` makes profile lookups fail.
    pub fn with_display_name(name: Option<&str>) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            pushes: Mutex::new(Vec::new()),
            display_name: name.map(str::to_string),
        }
    }

    pub fn replies(&self) -> Vec<Sent> {
        self.replies.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn pushes(&self) -> Vec<Sent> {
        self.pushes.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Pushed texts addressed to `user_id`, flattened in order.
    pub fn pushed_texts(&self, user_id: &str) -> Vec<String> {
        self.pushes()
            .into_iter()
            .filter(|s| s.target == user_id)
            .flat_map(|s| s.texts)
            .collect()
    }

    fn record(log: &Mutex<Vec<Sent>>, target: &str, messages: Vec<OutboundMessage>) {
        if let Ok(mut log) = log.lock() {
            log.push(Sent {
                target: target.to_string(),
                texts: messages.iter().map(|m| m.as_text().to_string()).collect(),
            });
        }
    }
}

impl Default for MockMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockMessenger {
    fn name(&self) -> &str {
        "mock-messenger"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Messenger
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), ShirokumaError> {
        Self::record(&self.replies, reply_token, messages);
        Ok(())
    }

    async fn push(
        &self,
        user_id: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), ShirokumaError> {
        Self::record(&self.pushes, user_id, messages);
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<UserProfile, ShirokumaError> {
        match &self.display_name {
            Some(name) => Ok(UserProfile {
                user_id: user_id.to_string(),
                display_name: name.clone(),
            }),
            None => Err(ShirokumaError::Channel {
                message: "profile lookup failed: 404".into(),
                source: None,
            }),
        }
    }
}
