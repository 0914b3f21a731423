//! Configuration management for the filedrop server.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/filedrop/config.toml`.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable seeding the initial upload token.
pub const UPLOAD_TOKEN_ENV: &str = "FILE_ACCESS_UPLOAD_TOKEN";

/// Environment variable seeding the super token.
pub const SUPER_TOKEN_ENV: &str = "FILE_ACCESS_SUPER_TOKEN";

/// Environment variable overriding the share root.
pub const ROOT_ENV: &str = "FILE_ACCESS_ROOT";

/// Environment variable overriding the listening port.
pub const PORT_ENV: &str = "FILE_ACCESS_PORT";

/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "FILE_ACCESS_LOG_LEVEL";

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("port must be greater than 0")]
    InvalidPort,

    #[error("bind_address must be an IP address, got {0}")]
    InvalidBindAddress(String),

    #[error("root cannot be empty")]
    EmptyRoot,

    #[error("max_upload_size must be greater than 0, got {0}")]
    InvalidMaxUploadSize(u64),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for the filedrop server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Listener and logging configuration.
    pub server: ServerConfig,

    /// Shared directory and upload limits.
    pub storage: StorageConfig,

    /// Optional seeds for the upload and super tokens.
    pub tokens: TokenConfig,
}

/// Listener and logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind.
    pub bind_address: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

/// Shared directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory whose contents are shared. Created at startup if missing.
    pub root: PathBuf,

    /// Directory holding static assets such as `favicon.ico`.
    pub static_dir: PathBuf,

    /// Largest accepted upload body in bytes (default: 1GiB).
    pub max_upload_size: u64,
}

/// Token seeds. Absent seeds mean freshly generated tokens.
///
/// Seeds are padded or truncated to the token length before use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TokenConfig {
    /// Seed for the initial rotating upload token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_token: Option<String>,

    /// Seed for the fixed super token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage").join("files"),
            static_dir: PathBuf::from("static"),
            max_upload_size: 1024 * 1024 * 1024, // 1GiB
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filedrop")
        .join("config.toml")
}

/// Read a non-empty environment variable.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - FILE_ACCESS_UPLOAD_TOKEN: Seed for the initial upload token
    /// - FILE_ACCESS_SUPER_TOKEN: Seed for the super token
    /// - FILE_ACCESS_ROOT: Override the shared directory
    /// - FILE_ACCESS_PORT: Override the listening port
    /// - FILE_ACCESS_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = env_value(UPLOAD_TOKEN_ENV) {
            tracing::info!("Using upload token seed from {}", UPLOAD_TOKEN_ENV);
            self.tokens.upload_token = Some(seed);
        }

        if let Some(seed) = env_value(SUPER_TOKEN_ENV) {
            tracing::info!("Using super token seed from {}", SUPER_TOKEN_ENV);
            self.tokens.super_token = Some(seed);
        }

        if let Some(root) = env_value(ROOT_ENV) {
            tracing::info!("Overriding root from environment: {}", root);
            self.storage.root = PathBuf::from(root);
        }

        if let Some(port) = env_value(PORT_ENV) {
            match port.parse() {
                Ok(port) => {
                    tracing::info!("Overriding port from environment: {}", port);
                    self.server.port = port;
                }
                Err(_) => tracing::warn!("Ignoring invalid {} value: {:?}", PORT_ENV, port),
            }
        }

        if let Some(level) = env_value(LOG_LEVEL_ENV) {
            tracing::info!("Overriding log_level from environment: {}", level);
            self.server.log_level = level;
        }
    }

    /// Log level to start the subscriber with, before any other override is
    /// applied. `FILE_ACCESS_LOG_LEVEL` wins over the file value.
    pub fn startup_log_level(&self) -> String {
        env_value(LOG_LEVEL_ENV)
            .unwrap_or_else(|| self.server.log_level.clone())
            .to_lowercase()
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        self.socket_addr()?;

        if self.storage.root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }

        if self.storage.max_upload_size == 0 {
            return Err(ConfigError::InvalidMaxUploadSize(
                self.storage.max_upload_size,
            ));
        }

        let level = self.server.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.server.log_level.clone()));
        }

        Ok(())
    }

    /// The socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.server.bind_address.clone()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Upload body limit as a `usize`, saturating on narrow targets.
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.storage.max_upload_size).unwrap_or(usize::MAX)
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
