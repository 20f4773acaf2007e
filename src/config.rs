//! Configuration module for disk.

use serde::Deserialize;
use std::path::Path;

use crate::{DiskError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body size in megabytes.
    #[serde(default = "default_max_request_size")]
    pub max_request_size_mb: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_request_size() -> usize {
    // A single item serializes to ~300 bytes; 60MB leaves room for
    // roughly 200k items per import.
    60
}

impl ServerConfig {
    /// Maximum request body size in bytes.
    pub fn max_request_size_bytes(&self) -> usize {
        self.max_request_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_request_size_mb: default_max_request_size(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite://path/to/file.db` or `postgres://...`).
    #[serde(default = "default_db_url")]
    pub url: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_url() -> String {
    "sqlite://data/disk.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Import pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Maximum number of bound parameters a single insert statement may carry.
    #[serde(default = "default_max_query_args")]
    pub max_query_args: usize,
}

/// SQLite's `SQLITE_MAX_VARIABLE_NUMBER` since 3.32; also below the
/// PostgreSQL bind limit.
pub const DEFAULT_MAX_QUERY_ARGS: usize = 32766;

fn default_max_query_args() -> usize {
    DEFAULT_MAX_QUERY_ARGS
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_query_args: default_max_query_args(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/disk.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Import pipeline configuration.
    #[serde(default)]
    pub import: ImportConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DiskError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DiskError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DISK_DATABASE_URL`: Override the database URL
    /// - `DISK_MAX_QUERY_ARGS`: Override the per-statement parameter ceiling
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DISK_DATABASE_URL") {
            if !url.is_empty() {
                self.database.url = url;
            }
        }

        if let Ok(value) = std::env::var("DISK_MAX_QUERY_ARGS") {
            match value.parse() {
                Ok(max_query_args) => self.import.max_query_args = max_query_args,
                Err(_) => tracing::warn!(
                    value = %value,
                    "Ignoring DISK_MAX_QUERY_ARGS: not a positive integer"
                ),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Column counts are checked against `max_query_args` separately, when
    /// the import limits are computed at startup.
    pub fn validate(&self) -> Result<()> {
        if self.import.max_query_args == 0 {
            return Err(DiskError::Config(
                "import.max_query_args must be greater than zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(DiskError::Config(
                "database.max_connections must be greater than zero".to_string(),
            ));
        }
        if self.server.max_request_size_mb == 0 {
            return Err(DiskError::Config(
                "server.max_request_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Maximum request body size in bytes.
    pub fn max_request_size_bytes(&self) -> usize {
        self.server.max_request_size_bytes()
    }
}
