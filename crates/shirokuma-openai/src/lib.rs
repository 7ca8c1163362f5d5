// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat-completions provider for the Shirokuma diagnosis service.
//!
//! This crate implements [`CompletionProvider`] over the `/chat/completions`
//! endpoint with a fixed model, temperature and token budget, plus the
//! refusal detector the pipeline uses to decide on its safer retry.

pub mod client;
pub mod refusal;
pub mod retry;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use shirokuma_config::model::OpenAiConfig;
use shirokuma_core::error::ShirokumaError;
use shirokuma_core::traits::{CompletionProvider, PluginAdapter};
use shirokuma_core::types::{
    AdapterType, CompletionRequest, CompletionResponse, TokenUsage,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest};

pub use crate::refusal::is_refusal;
pub use crate::retry::RetryPolicy;

/// Completion provider backed by the OpenAI API.
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Builds the provider from the `[openai]` config section.
    pub fn new(config: &OpenAiConfig) -> Result<Self, ShirokumaError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ShirokumaError::Config("openai.api_key is not set".into()))?;

        let policy = RetryPolicy {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        };
        let client = OpenAiClient::new(
            api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            policy,
        )?;

        info!(
            model = config.model,
            max_retries = config.max_retries,
            "OpenAI provider initialized"
        );

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn to_chat_request(&self, request: CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if !request.system.trim().is_empty() {
            messages.push(ChatMessage::system(request.system));
        }
        messages.push(ChatMessage::user(request.user));
        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ShirokumaError> {
        let chat = self.to_chat_request(request);
        let (response, stats) = self.client.complete_chat(&chat).await?;

        let choice = response.choices.first();
        let content = response.first_text().to_string();
        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        debug!(
            id = %response.id,
            attempts = stats.attempts,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "completion finished"
        );

        Ok(CompletionResponse {
            id: response.id.clone(),
            model: if response.model.is_empty() {
                self.model.clone()
            } else {
                response.model.clone()
            },
            finish_reason: choice.and_then(|c| c.finish_reason.clone()),
            content,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: Some("sk-test-key".into()),
            base_url: base_url.into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.5,
            max_tokens: 321,
            retry_base_delay_ms: 1,
            ..OpenAiConfig::default()
        }
    }

    #[test]
    fn missing_key_is_config_error() {
        let cfg = OpenAiConfig::default();
        assert!(matches!(
            OpenAiProvider::new(&cfg),
            Err(ShirokumaError::Config(_))
        ));
    }

    #[tokio::test]
    async fn complete_maps_request_and_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 321,
                "messages": [
                    {"role": "system", "content": "システム"},
                    {"role": "user", "content": "ENFPの診断"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-9",
                "model": "gpt-4o-mini-2024-07-18",
                "choices": [{"message": {"role": "assistant", "content": "診断結果"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 7}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&config(&server.uri())).unwrap();
        let resp = provider
            .complete(CompletionRequest {
                system: "システム".into(),
                user: "ENFPの診断".into(),
            })
            .await
            .unwrap();

        assert_eq!(resp.id, "chatcmpl-9");
        assert_eq!(resp.content, "診断結果");
        assert_eq!(resp.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.completion_tokens, 7);
    }

    #[tokio::test]
    async fn empty_choices_yield_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&config(&server.uri())).unwrap();
        let resp = provider
            .complete(CompletionRequest {
                system: String::new(),
                user: "x".into(),
            })
            .await
            .unwrap();
        assert!(resp.content.is_empty());
        assert!(is_refusal(&resp.content));
        assert_eq!(resp.model, "gpt-4o-mini");
    }
}
