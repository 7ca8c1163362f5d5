// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger trait for the chat platform (replies, pushes, profiles).

use async_trait::async_trait;

use crate::error::ShirokumaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{OutboundMessage, UserProfile};

/// Adapter for delivering messages to chat users.
#[async_trait]
pub trait Messenger: PluginAdapter {
    /// Answers an inbound event using its one-shot reply token.
    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), ShirokumaError>;

    /// Sends messages to a user outside of a reply window.
    async fn push(&self, user_id: &str, messages: Vec<OutboundMessage>)
    -> Result<(), ShirokumaError>;

    /// Looks up the user's display profile.
    async fn profile(&self, user_id: &str) -> Result<UserProfile, ShirokumaError>;
}
