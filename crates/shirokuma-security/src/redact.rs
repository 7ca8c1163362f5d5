// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret masking for log output and error messages.
//!
//! Values registered at startup are masked verbatim. Credential shapes that
//! may show up without being configured (OpenAI keys, bearer headers,
//! Cloudinary URLs, opaque LINE tokens) are masked by pattern.
//! [`RedactingWriter`] sits under the log formatter so no line escapes it.

use std::io::Write;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

const REDACTED: &str = "[REDACTED]";

static CREDENTIAL_SHAPES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"sk-[a-zA-Z0-9_\-]{20,}",
        r"Bearer\s+[a-zA-Z0-9._\-+/=]{10,}",
        r"cloudinary://[^\s@]+@[^\s]+",
        r"[A-Za-z0-9+/]{100,}={0,2}",
    ]
    .map(|shape| Regex::new(shape).unwrap())
});

/// Masks `secrets` and known credential shapes in `input`.
///
/// Longer secrets are replaced first so one that contains another is
/// masked whole.
pub fn redact(input: &str, secrets: &[String]) -> String {
    let mut ordered: Vec<&str> = secrets
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    ordered.sort_unstable_by(|a, b| b.len().cmp(&a.len()));

    let masked = ordered
        .into_iter()
        .fold(input.to_string(), |text, secret| text.replace(secret, REDACTED));

    CREDENTIAL_SHAPES.iter().fold(masked, |text, shape| {
        shape.replace_all(&text, REDACTED).into_owned()
    })
}

/// Shared list of configured secret values to mask.
#[derive(Debug, Clone, Default)]
pub struct SecretRegistry {
    values: Arc<RwLock<Vec<String>>>,
}

impl SecretRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret value. Blank values and duplicates are ignored.
    pub fn register(&self, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        if let Ok(mut values) = self.values.write()
            && !values.contains(&value)
        {
            values.push(value);
        }
    }

    /// Registers every `Some` value.
    pub fn register_all<'a>(&self, values: impl IntoIterator<Item = Option<&'a str>>) {
        for value in values.into_iter().flatten() {
            self.register(value);
        }
    }

    /// Masks `input` with the registered values and the generic patterns.
    pub fn redact(&self, input: &str) -> String {
        redact(input, &self.snapshot())
    }

    /// Copy of the current secret list.
    pub fn snapshot(&self) -> Vec<String> {
        self.values.read().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `io::Write` adapter that masks each buffer before passing it on.
pub struct RedactingWriter<W> {
    inner: W,
    secrets: SecretRegistry,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, secrets: SecretRegistry) -> Self {
        Self { inner, secrets }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let masked = self.secrets.redact(&String::from_utf8_lossy(buf));
        self.inner.write_all(masked.as_bytes())?;
        // The caller's bytes are consumed even when masking changed the length.
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
