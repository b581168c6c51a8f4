//! Client for the upstream chat service

use crate::{Result, WebError};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpStream;

/// Shared handle to the upstream `POST /api/chat` endpoint.
///
/// Only connecting is time limited; a reply may stream for as long as the
/// upstream keeps producing it.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    url: String,
    connect_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| WebError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            connect_timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward the client's `messages` array as received. Any non-success
    /// status is an error.
    pub async fn send(&self, messages: &Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "messages": messages }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebError::UpstreamStatus(status.as_u16()));
        }
        Ok(response)
    }

    /// Whether a TCP connection to the upstream host can be opened within the
    /// connect timeout.
    pub async fn is_reachable(&self) -> bool {
        let url = match reqwest::Url::parse(&self.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Upstream URL does not parse");
                return false;
            }
        };
        let (Some(host), Some(port)) = (url.host_str(), url.port_or_known_default()) else {
            return false;
        };

        match tokio::time::timeout(self.connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(%host, port, error = %e, "Upstream not reachable");
                false
            }
            Err(_) => {
                tracing::debug!(%host, port, "Upstream connect timed out");
                false
            }
        }
    }
}
