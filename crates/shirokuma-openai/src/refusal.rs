// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detection of model refusals in completion text.

/// Phrases that mark a refusal, matched case-insensitively.
pub const REFUSAL_PHRASES: &[&str] = &[
    "i'm sorry, but i can't",
    "i’m sorry, but i can’t",
    "i am sorry, but i cannot",
    "i'm unable to",
    "i cannot help with",
    "i can't help with",
    "i can't assist with",
    "i cannot assist with",
    "as an ai language model",
    "申し訳ありませんが、お応えできません",
    "申し訳ありませんが、対応できません",
    "申し訳ございませんが、お答えできません",
    "お答えすることはできません",
    "お手伝いすることはできません",
    "その依頼にはお応えできません",
];

/// True when `text` is empty or contains a refusal phrase.
pub fn is_refusal(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    REFUSAL_PHRASES.iter().any(|p| lowered.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_english_refusals_case_insensitively() {
        assert!(is_refusal("I'M SORRY, BUT I CAN'T help with that request."));
        assert!(is_refusal("As an AI language model, I do not predict fortunes."));
    }

    #[test]
    fn detects_japanese_refusals() {
        assert!(is_refusal("申し訳ありませんが、お応えできません。"));
        assert!(is_refusal("その内容についてはお答えすることはできません。"));
    }

    #[test]
    fn empty_text_is_refusal() {
        assert!(is_refusal(""));
        assert!(is_refusal("  \n"));
    }

    #[test]
    fn ordinary_diagnosis_is_not_refusal() {
        assert!(!is_refusal(
            "優雅なペガサスのあなたは、自由な発想で周りを明るくする人です。"
        ));
    }
}
