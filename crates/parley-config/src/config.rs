use crate::{ClientConfig, ConfigError, Result, ServerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete parley configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    /// Relay proxy settings
    pub server: ServerConfig,
    /// Chat client settings
    pub client: ClientConfig,
}

/// Command-line values that win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Bind host for the proxy
    pub host: Option<String>,
    /// Bind port for the proxy
    pub port: Option<u16>,
    /// Upstream chat endpoint
    pub upstream_url: Option<String>,
    /// Proxy endpoint used by the client
    pub endpoint: Option<String>,
}

impl ParleyConfig {
    /// Load configuration with precedence: defaults < file < env < overrides
    pub fn load(config_file: Option<PathBuf>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = Self::from_file_or_default(config_file)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, or the default location, falling back to defaults when no
    /// file exists. An explicitly named file must exist.
    pub fn from_file_or_default(config_file: Option<PathBuf>) -> Result<Self> {
        match config_file {
            Some(path) => Self::from_file(&path),
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `PARLEY_*` environment variables through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PARLEY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PARLEY_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PARLEY_PORT"),
            }
        }
        if let Some(url) = lookup("PARLEY_UPSTREAM_URL") {
            self.server.upstream_url = url;
        }
        if let Some(endpoint) = lookup("PARLEY_ENDPOINT") {
            self.client.endpoint = endpoint;
        }
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = overrides.upstream_url {
            self.server.upstream_url = url;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.client.endpoint = endpoint;
        }
    }

    /// Reject values the proxy or client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                field: "server.port",
                reason: "must be non-zero".to_string(),
            });
        }
        require_http_url("server.upstream_url", &self.server.upstream_url)?;
        require_http_url("client.endpoint", &self.client.endpoint)?;
        if self.client.slice_len == 0 {
            return Err(ConfigError::Invalid {
                field: "client.slice_len",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// `~/.config/parley/config.toml` on Linux, the platform equivalent elsewhere.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("parley").join("config.toml"))
    }

    /// Render the effective configuration as TOML.
    pub fn display_as_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))
    }

    /// Render the effective configuration as JSON.
    pub fn display_as_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))
    }

    /// Write a commented example config to `path`, creating parent
    /// directories as needed.
    pub fn write_example(path: &Path) -> Result<()> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, EXAMPLE_CONFIG).map_err(write_err)
    }
}

fn require_http_url(field: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("'{value}' is not an http(s) URL"),
        })
    }
}

const EXAMPLE_CONFIG: &str = r#"# parley configuration
# Location: ~/.config/parley/config.toml

[server]
# Address and port `parley serve` listens on
host = "127.0.0.1"
port = 3000

# Upstream chat service the proxy forwards to
upstream_url = "http://localhost:5000/api/chat"
upstream_connect_timeout_secs = 10

[client]
# Proxy endpoint the chat client talks to
endpoint = "http://127.0.0.1:3000/api/chat"

# Simulated typing: characters per slice and delay between slices
slice_len = 5
reveal_interval_ms = 25

# How long to wait before showing the "thinking" indicator
thinking_delay_ms = 400
"#;
