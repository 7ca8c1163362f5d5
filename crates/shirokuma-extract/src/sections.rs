// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splits a message into `【header】` blocks.

use std::sync::LazyLock;

use regex::Regex;

static HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"【([^】\n]+)】").unwrap());

/// The blocks of one message, in order of appearance.
#[derive(Debug)]
pub struct Sections<'a> {
    preamble: &'a str,
    blocks: Vec<(&'a str, &'a str)>,
}

impl<'a> Sections<'a> {
    pub fn parse(text: &'a str) -> Self {
        let headers: Vec<_> = HEADER.captures_iter(text).collect();
        let preamble_end = headers
            .first()
            .and_then(|c| c.get(0))
            .map_or(text.len(), |m| m.start());

        let mut blocks = Vec::with_capacity(headers.len());
        for (i, caps) in headers.iter().enumerate() {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            blocks.push((name.as_str().trim(), &text[whole.end()..end]));
        }

        Self {
            preamble: &text[..preamble_end],
            blocks,
        }
    }

    /// Text before the first header.
    pub fn preamble(&self) -> &'a str {
        self.preamble
    }

    /// Body of the first block named `name`.
    pub fn body(&self, name: &str) -> Option<&'a str> {
        self.blocks
            .iter()
            .find(|(header, _)| *header == name)
            .map(|(_, body)| *body)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_blocks() {
        let sections = Sections::parse("head\n【あなた】\na\n【お相手】b\n");
        assert_eq!(sections.preamble(), "head\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections.body("あなた"), Some("\na\n"));
        assert_eq!(sections.body("お相手"), Some("b\n"));
        assert_eq!(sections.body("質問"), None);
    }

    #[test]
    fn no_headers() {
        let sections = Sections::parse("plain text");
        assert!(sections.is_empty());
        assert_eq!(sections.preamble(), "plain text");
    }
}
