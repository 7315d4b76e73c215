//! Configuration for hashvault.
//!
//! Config priority: explicit `--config` path > user (~/.config/hashvault/config.toml) > defaults

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
  time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dirs;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read config {path:?}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Failed to parse config {path:?}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
  #[error("Failed to serialize config: {0}")]
  Serialize(#[from] toml::ser::Error),
  #[error("Invalid bind address {addr:?}: {source}")]
  InvalidBind {
    addr: String,
    #[source]
    source: std::net::AddrParseError,
  },
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP listener and store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Address the HTTP listener binds to
  /// Default: "127.0.0.1:3333"
  #[serde(default = "default_bind")]
  pub bind: String,

  /// Milliseconds between a reservation and its digest becoming visible (0 = immediate)
  /// Default: 5000
  #[serde(default = "default_hash_delay_ms")]
  pub hash_delay_ms: u64,

  /// Bounded mailbox size for each store actor
  /// Default: 100
  #[serde(default = "default_mailbox_capacity")]
  pub mailbox_capacity: usize,
}

fn default_bind() -> String {
  "127.0.0.1:3333".to_string()
}
fn default_hash_delay_ms() -> u64 {
  5000
}
fn default_mailbox_capacity() -> usize {
  100
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: default_bind(),
      hash_delay_ms: default_hash_delay_ms(),
      mailbox_capacity: default_mailbox_capacity(),
    }
  }
}

impl ServerConfig {
  pub fn hash_delay(&self) -> Duration {
    Duration::from_millis(self.hash_delay_ms)
  }

  pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
    self.bind.parse().map_err(|source| ConfigError::InvalidBind {
      addr: self.bind.clone(),
      source,
    })
  }
}

// ============================================================================
// Daemon Configuration
// ============================================================================

/// Process-level settings (logging)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
  /// Log level: "off", "error", "warn", "info", "debug", "trace"
  /// Default: "info"
  #[serde(default = "default_log_level")]
  pub log_level: String,

  /// Log file rotation: "daily", "hourly", "never"
  /// Default: "daily"
  #[serde(default = "default_log_rotation")]
  pub log_rotation: String,

  /// Write logs to a file in the data directory instead of the console
  /// Default: false
  pub log_to_file: bool,
}

fn default_log_level() -> String {
  "info".to_string()
}
fn default_log_rotation() -> String {
  "daily".to_string()
}

impl Default for DaemonConfig {
  fn default() -> Self {
    Self {
      log_level: default_log_level(),
      log_rotation: default_log_rotation(),
      log_to_file: false,
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// hashvault configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// HTTP listener and store settings
  #[serde(default)]
  pub server: ServerConfig,

  /// Process-level settings
  #[serde(default)]
  pub daemon: DaemonConfig,
}

impl Config {
  /// Load config from an explicit path, or the user config, or defaults.
  ///
  /// Errors only when an explicit path was given and cannot be used; a broken
  /// user config is reported and replaced by defaults.
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::from_path(path);
    }

    let user_config_path = Self::user_config_path();
    if !user_config_path.exists() {
      return Ok(Self::default());
    }

    match Self::from_path(&user_config_path) {
      Ok(config) => Ok(config),
      Err(e) => {
        warn!("Ignoring user config: {}", e);
        Ok(Self::default())
      }
    }
  }

  /// Parse a config file
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Get the user-level config path
  pub fn user_config_path() -> PathBuf {
    dirs::default_config_dir().join("config.toml")
  }

  /// Render the effective configuration as TOML
  pub fn to_toml(&self) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(self)?)
  }

  /// Generate a default config file as a string
  pub fn generate_template() -> String {
    let server = ServerConfig::default();
    let daemon = DaemonConfig::default();

    format!(
      r#"# hashvault Configuration
# Place in ~/.config/hashvault/config.toml or pass --config <path>

# ============================================================================
# Server
# ============================================================================

[server]
# Address the HTTP listener binds to
bind = "{bind}"

# Milliseconds to wait before a reservation's digest becomes retrievable.
# 0 computes the digest immediately (useful for testing).
hash_delay_ms = {hash_delay_ms}

# Bounded mailbox size for each store; producers wait when it is full
mailbox_capacity = {mailbox_capacity}

# ============================================================================
# Daemon
# ============================================================================

[daemon]
# Log level: off, error, warn, info, debug, trace (RUST_LOG overrides)
log_level = "{log_level}"

# Log file rotation when log_to_file is enabled: daily, hourly, never
log_rotation = "{log_rotation}"

# Write logs to the data directory instead of the console
log_to_file = {log_to_file}
"#,
      bind = server.bind,
      hash_delay_ms = server.hash_delay_ms,
      mailbox_capacity = server.mailbox_capacity,
      log_level = daemon.log_level,
      log_rotation = daemon.log_rotation,
      log_to_file = daemon.log_to_file,
    )
  }
}
