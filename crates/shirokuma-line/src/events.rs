// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook payload types.
//!
//! Only text messages from users are acted on; every other event kind is
//! parsed leniently into [`WebhookEvent::Other`] so new platform event
//! types never fail a batch.

use serde::Deserialize;
use serde_json::Value;

/// Top-level webhook body. Events stay raw so they can be forwarded as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub message: EventMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventMessage {
    Text {
        #[serde(default)]
        id: Option<String>,
        text: String,
    },
    #[serde(other)]
    Other,
}

/// A user text message with everything needed to answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvent {
    pub reply_token: String,
    pub user_id: String,
    pub text: String,
    pub message_id: Option<String>,
}

impl WebhookEvent {
    /// Parses one raw event; malformed events become [`WebhookEvent::Other`].
    pub fn from_value(raw: &Value) -> Self {
        serde_json::from_value(raw.clone()).unwrap_or(WebhookEvent::Other)
    }

    /// The text message carried by this event, if it is one with a reply
    /// token and a user id.
    pub fn into_text(self) -> Option<TextEvent> {
        let WebhookEvent::Message(event) = self else {
            return None;
        };
        let EventMessage::Text { id, text } = event.message else {
            return None;
        };
        Some(TextEvent {
            reply_token: event.reply_token?,
            user_id: event.source?.user_id?,
            text,
            message_id: id,
        })
    }
}
