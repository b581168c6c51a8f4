//! Client side of the chat endpoint
//!
//! [`ChatTransport`] is the seam between the session controller and the
//! network: it POSTs the turn history and hands back the raw reply body as a
//! byte stream. [`HttpTransport`] is the reqwest implementation.

use crate::turn::Turn;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;
use thiserror::Error;

/// Raw reply body, chunk by chunk
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

#[derive(Error, Debug)]
pub enum TransportError {
    /// The request never produced a response
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("Chat endpoint responded with status {status}")]
    Status { status: u16 },

    /// The body failed part way through
    #[error("Reply stream interrupted: {0}")]
    Interrupted(String),
}

/// Request body shared by the client, the proxy and the upstream
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [Turn],
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the full history and return the streamed reply body.
    async fn send(&self, turns: &[Turn]) -> Result<ByteStream, TransportError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, turns: &[Turn]) -> Result<ByteStream, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, turns = turns.len(), "Sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { messages: turns })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Interrupted(e.to_string())))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn collect(stream: ByteStream) -> Vec<u8> {
        stream
            .fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk.unwrap());
                acc
            })
            .await
    }

    #[tokio::test]
    async fn test_posts_history_and_streams_body() {
        let server = MockServer::start().await;
        let body = "data: {\"text\":\"Hi\"}\n\ndata: [DONE]\n\n";

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(format!("{}/api/chat", server.uri()));
        let stream = transport.send(&[Turn::user("hello")]).await.unwrap();

        assert_eq!(collect(stream).await, body.as_bytes());
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error":"x"}"#))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(format!("{}/api/chat", server.uri()));
        let err = transport.send(&[Turn::user("hello")]).await.err().unwrap();

        assert!(matches!(err, TransportError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_request_error() {
        // Port 9 (discard) is almost never listening locally
        let transport = HttpTransport::new("http://127.0.0.1:9/api/chat");
        let err = transport.send(&[Turn::user("hello")]).await.err().unwrap();

        assert!(matches!(err, TransportError::Request(_)));
    }
}
