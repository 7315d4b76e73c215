//! Serve command

use anyhow::{Context, Result};
use hashvault::{Daemon, RuntimeConfig, config::Config};
use tracing::info;

/// Apply command-line overrides on top of the loaded config
pub fn apply_overrides(config: &mut Config, bind: Option<String>, hash_delay_ms: Option<u64>) {
  if let Some(bind) = bind {
    config.server.bind = bind;
  }
  if let Some(hash_delay_ms) = hash_delay_ms {
    config.server.hash_delay_ms = hash_delay_ms;
  }
}

/// Run the server in the foreground until it drains
pub async fn cmd_serve(runtime_config: RuntimeConfig) -> Result<()> {
  let daemon = Daemon::new(runtime_config);
  daemon.run().await.context("Failed to run server")?;

  info!("Server exited cleanly");
  Ok(())
}
