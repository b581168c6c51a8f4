//! Tracing subscriber setup
//!
//! Non-interactive commands log to stderr. The chat TUI owns the terminal, so
//! it logs to `parley.log` in the platform data directory instead.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

const CRATES: &[&str] = &["parley_cli", "parley_core", "parley_web", "parley_config"];

/// Build a filter that applies `level` to parley's own crates. `RUST_LOG`
/// directives are added on top.
pub fn env_filter(level: LevelFilter) -> EnvFilter {
    let directives = CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::new(directives);

    match std::env::var("RUST_LOG") {
        Ok(extra) => extra
            .split(',')
            .filter_map(|d| d.parse().ok())
            .fold(filter, |filter, directive| filter.add_directive(directive)),
        Err(_) => filter,
    }
}

pub fn init_stderr(level: LevelFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .init();
}

/// Log to `path`, creating parent directories. Nothing is installed for
/// `LevelFilter::OFF`.
pub fn init_file(level: LevelFilter, path: &Path) -> Result<()> {
    if level == LevelFilter::OFF {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

/// `parley.log` in the platform data directory, or the working directory
/// when there is none.
pub fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("parley"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parley.log")
}
