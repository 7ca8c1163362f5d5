// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for the LLM endpoint.

use async_trait::async_trait;

use crate::error::ShirokumaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for chat-style completion endpoints.
///
/// Implementations own transport-level retry (429/5xx backoff). Refusal
/// handling is left to the caller, which decides whether to rephrase.
#[async_trait]
pub trait CompletionProvider: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ShirokumaError>;
}
