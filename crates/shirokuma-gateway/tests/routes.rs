// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use shirokuma_gateway::{ChannelSecret, GatewayState, SIGNATURE_HEADER, SecondaryForwarder, router};
use shirokuma_security::sign_body;
use shirokuma_test_utils::{TestHarness, text_event};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "test-channel-secret";
const FREE_TOTAL: &str = "《《《無料トータル診断》》》\n生年月日：1996年4月24日\nMBTI：ENFP";

fn app(harness: &TestHarness, forwarder: Option<SecondaryForwarder>) -> Router {
    let state = GatewayState {
        dispatcher: Arc::clone(&harness.dispatcher),
        forwarder: forwarder.map(Arc::new),
        started: Instant::now(),
    };
    router(state, ChannelSecret::new(SECRET))
}

fn signed_webhook(body: &Value) -> Request<Body> {
    let bytes = serde_json::to_vec(body).unwrap();
    Request::post("/webhook")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sign_body(SECRET, &bytes))
        .body(Body::from(bytes))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn valid_webhook_answers_ok_and_dispatches() {
    let harness = TestHarness::builder().build().unwrap();
    let body = json!({ "destination": "Ubot", "events": [text_event("U1", "t1", FREE_TOTAL)] });

    let response = app(&harness, None).oneshot(signed_webhook(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");

    harness.dispatcher.wait_idle().await;
    assert_eq!(harness.messenger.replies().len(), 1);
    assert_eq!(harness.provider.call_count(), 1);
    assert_eq!(harness.messenger.pushed_texts("U1").len(), 1);
}

#[tokio::test]
async fn missing_signature_is_unauthorized() {
    let harness = TestHarness::builder().build().unwrap();
    let request = Request::post("/webhook")
        .body(Body::from(r#"{"events":[]}"#))
        .unwrap();

    let response = app(&harness, None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_body_is_unauthorized_and_not_dispatched() {
    let harness = TestHarness::builder().build().unwrap();
    let original = serde_json::to_vec(&json!({ "events": [] })).unwrap();
    let tampered = json!({ "events": [text_event("U1", "t1", FREE_TOTAL)] });
    let request = Request::post("/webhook")
        .header(SIGNATURE_HEADER, sign_body(SECRET, &original))
        .body(Body::from(serde_json::to_vec(&tampered).unwrap()))
        .unwrap();

    let response = app(&harness, None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(harness.messenger.replies().is_empty());
}

#[tokio::test]
async fn signed_garbage_is_bad_request() {
    let harness = TestHarness::builder().build().unwrap();
    let bytes = b"not json".to_vec();
    let request = Request::post("/webhook")
        .header(SIGNATURE_HEADER, sign_body(SECRET, &bytes))
        .body(Body::from(bytes))
        .unwrap();

    let response = app(&harness, None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejected_events_still_answer_ok() {
    let harness = TestHarness::builder().build().unwrap();
    let body = json!({ "events": [text_event("U1", "t1", "こんにちは")] });

    let response = app(&harness, None).oneshot(signed_webhook(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(harness.provider.call_count(), 0);
}

#[tokio::test]
async fn events_are_forwarded_to_secondary_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let harness = TestHarness::builder().build().unwrap();
    let forwarder =
        SecondaryForwarder::new(format!("{}/hook", server.uri()), Duration::from_secs(5)).unwrap();
    let body = json!({
        "destination": "Ubot",
        "events": [
            text_event("U1", "t1", FREE_TOTAL),
            { "type": "follow", "replyToken": "t2", "source": { "type": "user", "userId": "U2" } }
        ]
    });

    let response = app(&harness, Some(forwarder))
        .oneshot(signed_webhook(&body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let received = server.received_requests().await.unwrap();
    let first: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(first["destination"], "Ubot");
    assert_eq!(first["events"][0]["replyToken"], "t1");
}

#[tokio::test]
async fn failing_secondary_webhook_does_not_affect_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harness = TestHarness::builder().build().unwrap();
    let forwarder = SecondaryForwarder::new(server.uri(), Duration::from_secs(5)).unwrap();
    let body = json!({ "events": [text_event("U1", "t1", FREE_TOTAL)] });

    let response = app(&harness, Some(forwarder))
        .oneshot(signed_webhook(&body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    harness.dispatcher.wait_idle().await;
    assert_eq!(harness.messenger.pushed_texts("U1").len(), 1);
}

#[tokio::test]
async fn slow_secondary_webhook_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let harness = TestHarness::builder().build().unwrap();
    let forwarder = SecondaryForwarder::new(server.uri(), Duration::from_millis(100)).unwrap();
    let body = json!({ "events": [text_event("U1", "t1", FREE_TOTAL)] });

    let started = Instant::now();
    let response = app(&harness, Some(forwarder))
        .oneshot(signed_webhook(&body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(started.elapsed() < Duration::from_secs(2));
}

fn form_request(body: Value) -> Request<Body> {
    Request::post("/webhook/form")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn form_submission_statuses() {
    let harness = TestHarness::builder().build().unwrap();
    let app = app(&harness, None);

    let ok = app
        .clone()
        .oneshot(form_request(json!({
            "line_user_id": "U1",
            "birthdate": "1996-04-24",
            "mbti": "ENFP",
            "form_id": "shirokuma-premium-form"
        })))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(harness.report.uploads().len(), 1);

    let unknown = app
        .clone()
        .oneshot(form_request(json!({
            "line_user_id": "U1",
            "birthdate": "1996-04-24",
            "mbti": "ENFP",
            "form_id": "unknown-form"
        })))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    let malformed = app
        .clone()
        .oneshot(form_request(json!({
            "line_user_id": "U1",
            "birthdate": "24/04/1996",
            "mbti": "ENFP",
            "form_id": "shirokuma-premium-form"
        })))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let traversal = app
        .clone()
        .oneshot(form_request(json!({
            "line_user_id": "../message/quota",
            "birthdate": "1996-04-24",
            "mbti": "ENFP",
            "form_id": "shirokuma-premium-form"
        })))
        .await
        .unwrap();
    assert_eq!(traversal.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.report.uploads().len(), 1);

    let missing_field = app
        .oneshot(form_request(json!({ "line_user_id": "U1" })))
        .await
        .unwrap();
    assert_eq!(missing_field.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn form_processing_failure_is_server_error() {
    let harness = TestHarness::builder()
        .with_report(shirokuma_test_utils::MockReport::failing_upload())
        .build()
        .unwrap();

    let response = app(&harness, None)
        .oneshot(form_request(json!({
            "line_user_id": "U1",
            "birthdate": "1996-04-24",
            "mbti": "ENFP",
            "form_id": "shirokuma-premium-form"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "processing failed"
    }
    "#);
}

#[tokio::test]
async fn status_endpoints_report_ok() {
    let harness = TestHarness::builder().build().unwrap();
    let app = app(&harness, None);

    for uri in ["/", "/health"] {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "shirokuma");
    }
    assert_eq!(harness.provider.call_count(), 0);
}
