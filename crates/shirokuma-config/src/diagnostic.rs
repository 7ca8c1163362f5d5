// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Figment errors and validation failures become [`ConfigError`] values that
//! miette renders with the offending line highlighted and, for misspelled
//! keys, a "did you mean" hint based on Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a known key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Source name used for TOML that did not come from a file.
pub const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(
        code(shirokuma::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        section: String,
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        #[label("not a {section} setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(shirokuma::config::invalid_type))]
    InvalidType { key: String, detail: String },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(shirokuma::config::missing_key),
        help("add `{key}` to shirokuma.toml")
    )]
    MissingKey { key: String },

    /// A credential that no source provided.
    #[error("missing required secret `{key}`")]
    #[diagnostic(
        code(shirokuma::config::missing_secret),
        help("set the `{env}` environment variable or `{key}` in shirokuma.toml")
    )]
    MissingSecret { key: String, env: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(shirokuma::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(shirokuma::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? accepted keys: {valid_keys}"),
        None => format!("accepted keys: {valid_keys}"),
    }
}

/// Converts every error inside a figment error.
///
/// `sources` holds `(path, content)` pairs of the TOML files that were
/// merged; they are used to point at the offending key.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let section = error.path.first().cloned().unwrap_or_default();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = source_of(&error, sources)
                        .and_then(|(path, content)| {
                            locate_key(content, &section, field).map(|offset| {
                                (
                                    SourceSpan::new(offset.into(), field.len()),
                                    NamedSource::new(path, content.to_string()),
                                )
                            })
                        })
                        .unzip();
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section,
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: dotted(&error.path, field),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: error.path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn dotted(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

/// The source an error came from, if it is one of `sources`. Errors from
/// in-memory TOML resolve to the `<inline>` entry.
fn source_of<'a>(
    error: &figment::error::Error,
    sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let wanted = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(path)) => path.display().to_string(),
        _ => INLINE_SOURCE.to_string(),
    };
    sources
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(name, content)| (name.as_str(), content.as_str()))
}

/// Byte offset of `field` inside the `[section]` table of `content`.
///
/// An empty `section` searches the top level. The search stops at the next
/// table header.
pub fn locate_key(content: &str, section: &str, field: &str) -> Option<usize> {
    let mut in_section = section.is_empty();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            let name = trimmed.trim_end().trim_start_matches('[').trim_end_matches(']');
            in_section = name.trim() == section;
        } else if in_section {
            let assigns = trimmed
                .strip_prefix(field)
                .is_some_and(|rest| rest.trim_start().starts_with('='));
            if assigns {
                return Some(offset + (line.len() - trimmed.len()));
            }
        }
        offset += line.len();
    }
    None
}

/// The known key closest to `unknown`, when it is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints every error to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
    eprintln!(
        "shirokuma: {} configuration problem{} found",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_channel_secret_for_typo() {
        let valid = &["channel_access_token", "channel_secret", "api_base_url"];
        assert_eq!(suggest_key("chanel_secret", valid), Some("channel_secret".to_string()));
    }

    #[test]
    fn suggests_closest_of_several() {
        let valid = &["api_key", "model", "temperature", "max_tokens"];
        assert_eq!(suggest_key("modle", valid), Some("model".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_key() {
        assert_eq!(suggest_key("zzzzzz", &["host", "port", "log_level"]), None);
    }

    #[test]
    fn locates_key_inside_its_section_only() {
        let content = "[line]\nport = 1\n[server]\nport = 2\n";
        let offset = locate_key(content, "server", "port").unwrap();
        assert_eq!(&content[offset..offset + 8], "port = 2");
    }

    #[test]
    fn key_prefix_does_not_match_longer_key() {
        let content = "[openai]\nmodel_name = \"x\"\n";
        assert_eq!(locate_key(content, "openai", "model"), None);
    }

    #[test]
    fn missing_secret_help_names_env_var() {
        let err = ConfigError::MissingSecret {
            key: "openai.api_key".into(),
            env: "OPENAI_API_KEY".into(),
        };
        let help = Diagnostic::help(&err).unwrap().to_string();
        assert!(help.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn missing_key_is_dotted() {
        assert_eq!(dotted(&["server".to_string()], "port"), "server.port");
        assert_eq!(dotted(&[], "server"), "server");
    }
}
