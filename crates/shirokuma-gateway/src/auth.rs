// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE webhook signature middleware.
//!
//! The body is buffered, checked against `x-line-signature`, and handed
//! on unchanged. Missing or invalid signatures are rejected with 401
//! before any event is looked at.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use shirokuma_security::verify_signature;

/// Header carrying the base64 HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Largest webhook body accepted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The channel secret used to verify webhook bodies.
#[derive(Clone)]
pub struct ChannelSecret(Arc<str>);

impl ChannelSecret {
    pub fn new(secret: impl AsRef<str>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }
}

impl std::fmt::Debug for ChannelSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChannelSecret([redacted])")
    }
}

pub async fn line_signature(
    State(secret): State<ChannelSecret>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let Some(signature) = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        tracing::warn!("webhook without signature rejected");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    if !verify_signature(&secret.0, &bytes, &signature) {
        tracing::warn!(bytes = bytes.len(), "webhook signature mismatch");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secret() {
        let secret = ChannelSecret::new("very-secret");
        assert!(!format!("{secret:?}").contains("very-secret"));
    }
}
