use anyhow::Result;
use parley_config::ParleyConfig;
use parley_core::HttpTransport;
use std::sync::Arc;

use crate::settings::controller_settings;
use crate::tui::{terminal::Terminal, ChatApp};

/// Run the interactive chat until the user quits.
pub async fn execute(config: ParleyConfig) -> Result<()> {
    tracing::info!(endpoint = %config.client.endpoint, "Starting chat");

    let transport = Arc::new(HttpTransport::new(config.client.endpoint.clone()));
    let app = ChatApp::new(transport, controller_settings(&config.client));

    let mut terminal = Terminal::new()?;
    terminal.enter()?;
    let result = app.run(&mut terminal).await;
    terminal.exit()?;
    result
}
