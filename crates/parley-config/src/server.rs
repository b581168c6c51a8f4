//! Relay proxy settings

use serde::{Deserialize, Serialize};

/// Settings for `parley serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Full URL of the upstream chat endpoint
    pub upstream_url: String,
    /// Connect timeout for the upstream, in seconds. The body itself is not
    /// time limited.
    pub upstream_connect_timeout_secs: u64,
    /// Largest accepted request body, in bytes
    pub max_body_bytes: usize,
    /// Browser origins allowed by CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            upstream_url: "http://localhost:5000/api/chat".to_string(),
            upstream_connect_timeout_secs: 10,
            max_body_bytes: 10 * 1024 * 1024,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
