//! `POST /api/chat`: validate, forward, relay

use crate::server::AppState;
use crate::{Result, WebError};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderValue},
    response::Response,
    routing::post,
    Router,
};
use futures::TryStreamExt;
use parley_core::validate_request;
use serde_json::Value;

pub fn chat_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .with_state(state)
}

/// The body is read raw so that unparseable JSON is an internal error rather
/// than an extractor rejection.
async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| WebError::InvalidBody(format!("not JSON: {e}")))?;
    if payload.is_null() {
        return Err(WebError::InvalidBody("body is null".to_string()));
    }

    let turns = validate_request(&payload)?;
    tracing::debug!(turns = turns.len(), "Forwarding chat request upstream");

    // Validation guarantees `messages` is present; it goes upstream untouched
    let upstream = state.upstream.send(&payload["messages"]).await?;
    let stream = upstream
        .bytes_stream()
        .inspect_err(|e| tracing::warn!(error = %e, "Upstream stream ended with an error"));

    let mut response = Response::new(Body::from_stream(stream));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    Ok(response)
}
