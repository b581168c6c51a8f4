//! Chat client settings

use parley_core::{APOLOGY_MESSAGE, WELCOME_MESSAGE};
use serde::{Deserialize, Serialize};

/// Settings for the interactive client and `parley ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Proxy chat endpoint the client posts to
    pub endpoint: String,
    /// Delay between simulated reveal slices, in milliseconds
    pub reveal_interval_ms: u64,
    /// Characters revealed per simulated slice
    pub slice_len: usize,
    /// Wait before the "thinking" placeholder shows, in milliseconds
    pub thinking_delay_ms: u64,
    /// Canned message played when a conversation starts
    pub welcome_message: String,
    /// Canned message played when a request fails
    pub apology_message: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/api/chat".to_string(),
            reveal_interval_ms: 25,
            slice_len: 5,
            thinking_delay_ms: 400,
            welcome_message: WELCOME_MESSAGE.to_string(),
            apology_message: APOLOGY_MESSAGE.to_string(),
        }
    }
}
