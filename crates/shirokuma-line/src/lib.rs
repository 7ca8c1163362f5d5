// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE messaging adapter for the Shirokuma diagnosis service.
//!
//! Implements [`Messenger`] over the Messaging API (reply, push, profile)
//! and provides the webhook payload types the gateway parses.

pub mod client;
pub mod events;

use async_trait::async_trait;
use shirokuma_config::model::LineConfig;
use shirokuma_core::error::ShirokumaError;
use shirokuma_core::traits::{Messenger, PluginAdapter};
use shirokuma_core::types::{AdapterType, OutboundMessage, UserProfile};
use tracing::info;

use crate::client::{LineClient, to_batches};

pub use crate::client::is_valid_user_id;
pub use crate::events::{TextEvent, WebhookBody, WebhookEvent};

/// [`Messenger`] backed by the LINE Messaging API.
pub struct LineMessenger {
    client: LineClient,
}

impl LineMessenger {
    /// Requires `line.channel_access_token`.
    pub fn new(config: &LineConfig) -> Result<Self, ShirokumaError> {
        let token = config
            .channel_access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ShirokumaError::Config("line.channel_access_token is not set".into()))?;
        let client = LineClient::new(token, &config.api_base_url)?;
        info!(base_url = %config.api_base_url, "LINE messenger initialized");
        Ok(Self { client })
    }

    pub fn client(&self) -> &LineClient {
        &self.client
    }
}

fn texts(messages: Vec<OutboundMessage>) -> impl Iterator<Item = String> {
    messages.into_iter().map(|m| match m {
        OutboundMessage::Text(t) => t,
    })
}

#[async_trait]
impl PluginAdapter for LineMessenger {
    fn name(&self) -> &str {
        "line"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Messenger
    }
}

#[async_trait]
impl Messenger for LineMessenger {
    /// A reply token is single-use, so only the first batch is sent.
    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), ShirokumaError> {
        match to_batches(texts(messages)).into_iter().next() {
            Some(batch) => self.client.reply(reply_token, &batch).await,
            None => Ok(()),
        }
    }

    async fn push(
        &self,
        user_id: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), ShirokumaError> {
        for batch in to_batches(texts(messages)) {
            self.client.push(user_id, &batch).await?;
        }
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<UserProfile, ShirokumaError> {
        let profile = self.client.profile(user_id).await?;
        Ok(UserProfile {
            user_id: profile.user_id,
            display_name: profile.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base: &str) -> LineConfig {
        LineConfig {
            channel_access_token: Some("line-token".into()),
            channel_secret: Some("secret".into()),
            api_base_url: base.into(),
        }
    }

    #[test]
    fn requires_access_token() {
        let mut cfg = config("https://api.line.me");
        cfg.channel_access_token = None;
        assert!(matches!(
            LineMessenger::new(&cfg),
            Err(ShirokumaError::Config(_))
        ));
    }

    #[tokio::test]
    async fn push_sends_every_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/push"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let messenger = LineMessenger::new(&config(&server.uri())).unwrap();
        let messages = (0..6).map(|i| OutboundMessage::text(format!("m{i}"))).collect();
        messenger.push("U1", messages).await.unwrap();
    }

    #[tokio::test]
    async fn empty_reply_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let messenger = LineMessenger::new(&config(&server.uri())).unwrap();
        messenger.reply("rt", vec![]).await.unwrap();
    }

    #[tokio::test]
    async fn profile_maps_to_user_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/bot/profile/U9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "displayName": "ゆき", "userId": "U9"
            })))
            .mount(&server)
            .await;

        let messenger = LineMessenger::new(&config(&server.uri())).unwrap();
        let profile = messenger.profile("U9").await.unwrap();
        assert_eq!(profile.display_name, "ゆき");
        assert_eq!(profile.user_id, "U9");
    }
}
