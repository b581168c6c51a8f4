use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures::StreamExt;
use parley_core::Turn;
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::{echo_text, reply_frames, UpstreamBehavior};

/// Configuration for the mock upstream
#[derive(Debug, Clone)]
pub struct MockUpstreamConfig {
    pub behavior: UpstreamBehavior,

    /// Characters per `data:` frame
    pub chunk_chars: usize,

    /// Pause before each frame when the behavior is delayed
    pub chunk_delay: Duration,
}

impl Default for MockUpstreamConfig {
    fn default() -> Self {
        Self {
            behavior: UpstreamBehavior::default(),
            chunk_chars: 4,
            chunk_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    #[serde(default)]
    messages: Vec<Turn>,
}

/// Router serving `POST /api/chat` according to `config`.
pub fn router(config: MockUpstreamConfig) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(Arc::new(config))
}

async fn chat(
    State(config): State<Arc<MockUpstreamConfig>>,
    Json(body): Json<ChatBody>,
) -> Response {
    tracing::info!(
        behavior = config.behavior.as_str(),
        turns = body.messages.len(),
        "Chat request"
    );

    if config.behavior == UpstreamBehavior::Fail {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable").into_response();
    }

    let frames = reply_frames(&echo_text(&body.messages), config.chunk_chars);
    let delay = config.behavior.is_delayed().then_some(config.chunk_delay);

    let stream = futures::stream::iter(frames).then(move |frame| async move {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok::<_, Infallible>(frame)
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}
