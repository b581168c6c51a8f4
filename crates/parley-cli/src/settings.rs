use parley_config::ClientConfig;
use parley_core::{ControllerSettings, RevealOptions};
use std::time::Duration;

/// Translate `[client]` config into controller settings.
pub fn controller_settings(config: &ClientConfig) -> ControllerSettings {
    ControllerSettings {
        reveal: RevealOptions {
            slice_len: config.slice_len,
            interval: Duration::from_millis(config.reveal_interval_ms),
        },
        thinking_delay: Duration::from_millis(config.thinking_delay_ms),
        welcome: config.welcome_message.clone(),
        apology: config.apology_message.clone(),
    }
}
