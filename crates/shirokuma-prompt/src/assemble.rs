// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a template and an environment into completion messages.

use serde_json::Value;
use shirokuma_core::types::CompletionRequest;

use crate::render::render;
use crate::template::PromptTemplate;

/// System message shared by every diagnosis type.
pub const BASE_SYSTEM_PROMPT: &str = "あなたはMBTIと生年月日をもとに性格や相性を読み解く診断士です。\
占いとエンターテインメントの範囲で、前向きで具体的な言葉を日本語で届けてください。";

/// System message used for the single retry after a refusal.
pub const SAFER_SYSTEM_PROMPT: &str = "これは娯楽目的の性格診断コンテンツです。\
医療・法律・金融に関する断定的な助言は避け、一般的で前向きな性格の傾向とアドバイスだけを日本語で書いてください。\
診断を断る必要はありません。";

/// The rendered pieces of one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    /// Base system message plus the template tone.
    pub system: String,
    /// Preamble, extra instructions and structure guide.
    pub user: String,
    /// Rendered summary block, when the template has one.
    pub summary: Option<String>,
    /// Rendered closing text.
    pub closing: String,
}

impl AssembledPrompt {
    pub fn request(&self) -> CompletionRequest {
        CompletionRequest {
            system: self.system.clone(),
            user: self.user.clone(),
        }
    }

    /// The same user prompt under the safer system message.
    pub fn safer_request(&self) -> CompletionRequest {
        CompletionRequest {
            system: join_blocks([SAFER_SYSTEM_PROMPT.to_string(), tone_of(&self.system)]),
            user: self.user.clone(),
        }
    }
}

/// Renders `template` against `env`.
pub fn assemble(template: &PromptTemplate, env: &Value) -> AssembledPrompt {
    let guide = template
        .structure_guide
        .iter()
        .map(|line| render(line, env))
        .collect::<Vec<_>>()
        .join("\n");

    let user = join_blocks([
        render(&template.preamble, env),
        render(&template.extra_instructions, env),
        guide,
    ]);

    AssembledPrompt {
        system: join_blocks([BASE_SYSTEM_PROMPT.to_string(), render(&template.tone, env)]),
        user,
        summary: template
            .summary_block
            .as_deref()
            .map(|s| render(s, env).trim().to_string())
            .filter(|s| !s.is_empty()),
        closing: render(&template.closing, env).trim().to_string(),
    }
}

/// Joins non-empty blocks with a blank line.
fn join_blocks<const N: usize>(blocks: [String; N]) -> String {
    blocks
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The tone part of an assembled system message.
fn tone_of(system: &str) -> String {
    system
        .strip_prefix(BASE_SYSTEM_PROMPT)
        .unwrap_or_default()
        .trim()
        .to_string()
}
