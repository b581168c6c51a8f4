use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use parley_cli::{
    cli::{Cli, Commands},
    commands, logging,
};
use parley_config::{ConfigOverrides, ParleyConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let requested = cli.requested_level();
    let command = cli.command.unwrap_or(Commands::Chat);

    // The chat TUI owns the terminal, everything else logs to stderr
    match &command {
        Commands::Chat => logging::init_file(
            requested.unwrap_or(LevelFilter::OFF),
            &logging::default_log_path(),
        )?,
        Commands::Serve { .. } => logging::init_stderr(requested.unwrap_or(LevelFilter::INFO)),
        _ => logging::init_stderr(requested.unwrap_or(LevelFilter::WARN)),
    }

    let mut overrides = ConfigOverrides {
        endpoint: cli.endpoint,
        ..Default::default()
    };
    if let Commands::Serve {
        host,
        port,
        upstream_url,
    } = &command
    {
        overrides.host = host.clone();
        overrides.port = *port;
        overrides.upstream_url = upstream_url.clone();
    }

    if let Commands::Config(cmd) = command {
        return commands::config::execute(cmd, cli.config, overrides).await;
    }

    let config = ParleyConfig::load(cli.config, overrides)?;
    tracing::debug!(?config, "Loaded configuration");

    match command {
        Commands::Chat => commands::chat::execute(config).await?,
        Commands::Ask { question } => commands::ask::execute(config, question).await?,
        Commands::Serve { .. } => commands::serve::execute(config).await?,
        Commands::Config(_) => {}
    }

    Ok(())
}
