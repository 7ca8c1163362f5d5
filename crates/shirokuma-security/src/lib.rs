// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Security primitives for the Shirokuma diagnosis service.
//!
//! Provides secret masking for every log sink and error message, and
//! HMAC-SHA256 verification of inbound webhook payloads.

pub mod redact;
pub mod signature;

pub use redact::{redact, RedactingWriter, SecretRegistry};
pub use signature::{sign_body, verify_signature};
