//! Logging utilities for CLI commands and the server

use hashvault::config::DaemonConfig;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Get the hashvault data directory (respects env vars)
pub fn data_dir() -> PathBuf {
  hashvault::dirs::default_data_dir()
}

/// Initialize logging for client commands (console only, warnings and up)
pub fn init_cli_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();
}

/// Parse log level from config string
fn parse_log_level(level: &str) -> LevelFilter {
  match level.to_lowercase().as_str() {
    "off" => LevelFilter::OFF,
    "error" => LevelFilter::ERROR,
    "warn" => LevelFilter::WARN,
    "info" => LevelFilter::INFO,
    "debug" => LevelFilter::DEBUG,
    "trace" => LevelFilter::TRACE,
    _ => LevelFilter::INFO,
  }
}

/// Initialize logging for the server with config-driven settings.
///
/// Console with colors by default; a rolling file in the data directory
/// (no ANSI) when `log_to_file` is set.
///
/// Returns the guard that must be kept alive for the duration of the program
pub fn init_server_logging(daemon_config: &DaemonConfig) -> Option<WorkerGuard> {
  let level = parse_log_level(&daemon_config.log_level);

  // Build env filter (allows RUST_LOG override)
  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  if !daemon_config.log_to_file {
    tracing_subscriber::fmt()
      .with_env_filter(env_filter)
      .with_target(true)
      .with_ansi(true)
      .init();
    return None;
  }

  let log_dir = data_dir();
  if let Err(e) = std::fs::create_dir_all(&log_dir) {
    // Fall back to console-only logging
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::warn!("Failed to create log directory {:?}: {}", log_dir, e);
    return None;
  }

  let file_name = hashvault::dirs::log_file_name();
  let file_appender = match daemon_config.log_rotation.as_str() {
    "hourly" => tracing_appender::rolling::hourly(&log_dir, file_name),
    "never" => tracing_appender::rolling::never(&log_dir, file_name),
    _ => tracing_appender::rolling::daily(&log_dir, file_name),
  };

  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(true)
    .with_ansi(false)
    .with_writer(file_writer)
    .init();

  Some(guard)
}
