//! # parley configuration
//!
//! Settings for the relay proxy (`[server]`) and the chat client (`[client]`),
//! loaded with precedence defaults < TOML file < environment < command line.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! upstream_url = "http://localhost:5000/api/chat"
//!
//! [client]
//! endpoint = "http://127.0.0.1:3000/api/chat"
//! reveal_interval_ms = 25
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod server;

pub use client::ClientConfig;
pub use config::{ConfigOverrides, ParleyConfig};
pub use server::ServerConfig;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was being parsed
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    /// The config could not be written.
    #[error("Failed to write config file {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The configuration could not be rendered.
    #[error("Failed to render config: {0}")]
    Render(String),

    /// The platform has no config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// A value is out of range or malformed.
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
