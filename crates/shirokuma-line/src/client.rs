// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the LINE Messaging API.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use shirokuma_core::ShirokumaError;
use tracing::debug;

/// Characters per text message accepted by the platform.
pub const MAX_TEXT_CHARS: usize = 5000;
/// Messages per reply or push call.
pub const MAX_MESSAGES_PER_CALL: usize = 5;

/// Whether `user_id` is safe to place in an API path: 1 to 64 ASCII
/// letters, digits, `_` or `-`. Real ids are `U` followed by 32 hex digits.
pub fn is_valid_user_id(user_id: &str) -> bool {
    (1..=64).contains(&user_id.len())
        && user_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LineMessage {
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyBody<'a> {
    reply_token: &'a str,
    messages: &'a [LineMessage],
}

#[derive(Debug, Serialize)]
struct PushBody<'a> {
    to: &'a str,
    messages: &'a [LineMessage],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LineClient {
    client: reqwest::Client,
    base_url: String,
}

impl LineClient {
    pub fn new(access_token: &str, base_url: &str) -> Result<Self, ShirokumaError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|e| {
            ShirokumaError::Config(format!("invalid channel access token header value: {e}"))
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ShirokumaError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /v2/bot/message/reply`.
    pub async fn reply(
        &self,
        reply_token: &str,
        messages: &[LineMessage],
    ) -> Result<(), ShirokumaError> {
        let body = ReplyBody {
            reply_token,
            messages,
        };
        self.post("/v2/bot/message/reply", &body).await
    }

    /// `POST /v2/bot/message/push`.
    pub async fn push(&self, to: &str, messages: &[LineMessage]) -> Result<(), ShirokumaError> {
        let body = PushBody { to, messages };
        self.post("/v2/bot/message/push", &body).await
    }

    /// `GET /v2/bot/profile/{userId}`.
    pub async fn profile(&self, user_id: &str) -> Result<ProfileResponse, ShirokumaError> {
        if !is_valid_user_id(user_id) {
            return Err(ShirokumaError::Channel {
                message: format!("refusing profile lookup for malformed user id {user_id:?}"),
                source: None,
            });
        }
        let url = format!("{}/v2/bot/profile/{user_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error("profile", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("profile", status, &body));
        }
        response
            .json::<ProfileResponse>()
            .await
            .map_err(|e| request_error("profile", e))
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ShirokumaError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| request_error(path, e))?;
        let status = response.status();
        debug!(path, status = %status, "LINE API response");
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(status_error(path, status, &text))
    }
}

/// Splits outbound text into platform-sized messages.
///
/// Each text is cut into chunks of at most [`MAX_TEXT_CHARS`] characters,
/// then the result is grouped into batches of [`MAX_MESSAGES_PER_CALL`].
pub fn to_batches(texts: impl IntoIterator<Item = String>) -> Vec<Vec<LineMessage>> {
    let messages: Vec<LineMessage> = texts
        .into_iter()
        .flat_map(|t| split_text(&t, MAX_TEXT_CHARS))
        .map(|text| LineMessage::Text { text })
        .collect();
    messages
        .chunks(MAX_MESSAGES_PER_CALL)
        .map(<[LineMessage]>::to_vec)
        .collect()
}

fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

fn request_error(what: &str, e: reqwest::Error) -> ShirokumaError {
    ShirokumaError::Channel {
        message: format!("LINE {what} request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

fn status_error(what: &str, status: reqwest::StatusCode, body: &str) -> ShirokumaError {
    ShirokumaError::Channel {
        message: format!("LINE {what} returned {status}: {body}"),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn text(s: &str) -> LineMessage {
        LineMessage::Text { text: s.into() }
    }

    #[tokio::test]
    async fn reply_posts_token_and_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .and(header("authorization", "Bearer line-token"))
            .and(body_json(json!({
                "replyToken": "rt-1",
                "messages": [{"type": "text", "text": "受け付けました"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = LineClient::new("line-token", &server.uri()).unwrap();
        client.reply("rt-1", &[text("受け付けました")]).await.unwrap();
    }

    #[tokio::test]
    async fn push_posts_recipient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/push"))
            .and(body_json(json!({
                "to": "U123",
                "messages": [{"type": "text", "text": "結果です"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = LineClient::new("line-token", &format!("{}/", server.uri())).unwrap();
        client.push("U123", &[text("結果です")]).await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid reply token"})),
            )
            .mount(&server)
            .await;

        let client = LineClient::new("line-token", &server.uri()).unwrap();
        let err = client.reply("expired", &[text("x")]).await.unwrap_err();
        assert!(matches!(err, ShirokumaError::Channel { .. }));
        assert!(err.to_string().contains("400"), "got: {err}");
    }

    #[tokio::test]
    async fn profile_parses_display_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/bot/profile/U123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "displayName": "しろくま",
                "userId": "U123",
                "language": "ja",
                "pictureUrl": "https://profile.line-scdn.net/abc"
            })))
            .mount(&server)
            .await;

        let client = LineClient::new("line-token", &server.uri()).unwrap();
        let profile = client.profile("U123").await.unwrap();
        assert_eq!(profile.display_name, "しろくま");
        assert!(profile.picture_url.is_some());
    }

    #[tokio::test]
    async fn profile_rejects_path_segments_in_user_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = LineClient::new("line-token", &server.uri()).unwrap();
        for id in ["../message/quota", "U1/../../info", "..", "U1?x=1", ""] {
            let err = client.profile(id).await.unwrap_err();
            assert!(matches!(err, ShirokumaError::Channel { .. }), "{id}: {err}");
        }
    }

    #[test]
    fn user_id_shape() {
        assert!(is_valid_user_id("U4af4980629a1b2c3d4e5f60718293a4b"));
        assert!(is_valid_user_id("U1"));
        assert!(!is_valid_user_id("U1/.."));
        assert!(!is_valid_user_id("U1%2F"));
        assert!(!is_valid_user_id(&"U".repeat(65)));
    }

    #[test]
    fn long_text_is_split_and_batched() {
        let long = "あ".repeat(MAX_TEXT_CHARS * 2 + 1);
        let batches = to_batches(vec![long, String::new(), "b".into(), "c".into(), "d".into()]);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 5);
        assert_eq!(batches[1], vec![text("d")]);
        let LineMessage::Text { text: first } = &batches[0][0];
        assert_eq!(first.chars().count(), MAX_TEXT_CHARS);
    }
}
