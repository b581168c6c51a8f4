//! Integration tests for the chat relay, with wiremock standing in for the
//! upstream chat service.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parley_config::ServerConfig;
use parley_web::{build_router, AppState, UpstreamClient};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPLY: &str =
    "data: {\"text\":\"Hel\"}\n\ndata: {\"text\":\"lo \\u00e9\"}\n\ndata: [DONE]\n\n";

fn router_for(upstream_url: String) -> Router {
    let config = ServerConfig {
        upstream_url: upstream_url.clone(),
        ..Default::default()
    };
    let upstream = UpstreamClient::new(upstream_url, Duration::from_secs(2)).unwrap();
    build_router(AppState::new(upstream), &config)
}

async fn upstream_replying(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn chat_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(router: Router, body: impl Into<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router.oneshot(chat_request(body)).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, bytes.to_vec())
}

async fn send_json(router: Router, payload: Value) -> (StatusCode, Value) {
    let (status, _, bytes) = send(router, payload.to_string()).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_valid_payload_is_relayed_byte_for_byte() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "messages": [
                { "role": "assistant", "content": "Welcome" },
                { "role": "user", "content": "Hi" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(REPLY, "text/plain"))
        .expect(1)
        .mount(&upstream)
        .await;

    let router = router_for(format!("{}/api/chat", upstream.uri()));
    let payload = json!({
        "messages": [
            { "role": "assistant", "content": "Welcome" },
            { "role": "user", "content": "Hi" }
        ]
    });
    let (status, headers, body) = send(router, payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, REPLY.as_bytes());
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers[header::CONNECTION], "keep-alive");
}

#[tokio::test]
async fn test_each_validation_rule_returns_its_message() {
    let upstream = MockServer::start().await;
    let url = format!("{}/api/chat", upstream.uri());

    let cases = [
        (json!({}), "Messages should be an array.", "messages_not_array"),
        (json!({ "messages": "hi" }), "Messages should be an array.", "messages_not_array"),
        (json!({ "messages": [] }), "Messages array cannot be empty.", "messages_empty"),
        (
            json!({ "messages": [null] }),
            "Message at index 0 is invalid.",
            "message_invalid",
        ),
        (
            json!({ "messages": [{ "role": "user", "content": 5 }] }),
            "Message at index 0 must have 'role' and 'content' as strings.",
            "message_fields_not_strings",
        ),
        (
            json!({ "messages": [
                { "role": "user", "content": "a" },
                { "role": "system", "content": "b" }
            ] }),
            "Message at index 1 has an invalid role 'system'.",
            "message_invalid_role",
        ),
        (
            json!({ "messages": [{ "role": "assistant", "content": "a" }] }),
            "The last message must be from the user.",
            "last_message_not_user",
        ),
    ];

    for (payload, message, code) in cases {
        let (status, body) = send_json(router_for(url.clone()), payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body["error"], message, "payload {payload}");
        assert_eq!(body["code"], code, "payload {payload}");
    }

    // Nothing invalid ever reaches the upstream
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rules_are_checked_element_by_element() {
    let upstream = MockServer::start().await;
    let router = router_for(format!("{}/api/chat", upstream.uri()));

    // Element 0 has a bad role, element 1 is not even an object
    let payload = json!({ "messages": [{ "role": "bot", "content": "x" }, 7] });
    let (status, body) = send_json(router, payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message at index 0 has an invalid role 'bot'.");
}

#[tokio::test]
async fn test_upstream_error_status_becomes_500() {
    let upstream = upstream_replying(ResponseTemplate::new(503)).await;
    let router = router_for(format!("{}/api/chat", upstream.uri()));

    let payload = json!({ "messages": [{ "role": "user", "content": "Hi" }] });
    let (status, body) = send_json(router, payload).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}

#[tokio::test]
async fn test_unreachable_upstream_becomes_500() {
    let upstream = MockServer::start().await;
    let url = format!("{}/api/chat", upstream.uri());
    drop(upstream);

    let payload = json!({ "messages": [{ "role": "user", "content": "Hi" }] });
    let (status, body) = send_json(router_for(url), payload).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}

#[tokio::test]
async fn test_unparseable_and_null_bodies_are_internal_errors() {
    let upstream = upstream_replying(ResponseTemplate::new(200)).await;
    let url = format!("{}/api/chat", upstream.uri());

    for raw in ["{not json", "null", ""] {
        let (status, _, body) = send(router_for(url.clone()), raw).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body {raw:?}");
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Internal Server Error");
    }
}

#[tokio::test]
async fn test_extra_turn_fields_reach_the_upstream() {
    let upstream = upstream_replying(
        ResponseTemplate::new(200).set_body_raw(REPLY, "text/event-stream"),
    )
    .await;
    let router = router_for(format!("{}/api/chat", upstream.uri()));

    let payload = json!({
        "messages": [
            { "role": "assistant", "content": "Welcome", "animated": true },
            { "role": "user", "content": "Hi", "id": "m1" }
        ]
    });
    let (status, _, _) = send(router, payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let requests = upstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(forwarded, payload);
}

#[tokio::test]
async fn test_health_is_always_ok() {
    let router = router_for("http://127.0.0.1:9/api/chat".to_string());
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn ready(router: Router) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_ready_when_upstream_accepts_connections() {
    let upstream = MockServer::start().await;
    let url = format!("{}/api/chat", upstream.uri());

    let (status, body) = ready(router_for(url.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ready", "upstream": url }));
}

#[tokio::test]
async fn test_not_ready_when_upstream_is_down() {
    let upstream = MockServer::start().await;
    let url = format!("{}/api/chat", upstream.uri());
    drop(upstream);

    let (status, body) = ready(router_for(url)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "upstream_unreachable");

    let (status, _) = ready(router_for("not a url".to_string())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
