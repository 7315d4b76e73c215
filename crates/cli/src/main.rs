//! hashvault CLI - password hashing service with delayed digests

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hashvault::{RuntimeConfig, config::Config};
use std::path::{Path, PathBuf};

mod commands;
mod logging;

use commands::{
  apply_overrides, cmd_config_init, cmd_config_show, cmd_digest, cmd_get, cmd_hash, cmd_serve, cmd_shutdown, cmd_stats,
};
use logging::{init_cli_logging, init_server_logging};

#[derive(Parser)]
#[command(name = "hashvault")]
#[command(about = "Password hashing service with delayed digests and graceful drain")]
#[command(after_help = "\
QUICK START:
  hashvault serve                      # Start the server (127.0.0.1:3333)
  hashvault hash angryMonkey           # Reserve an id, prints it
  hashvault get 1                      # Digest, once the delay has passed
  hashvault stats                      # Request count and average latency
  hashvault shutdown                   # Drain pending digests and exit")]
struct Cli {
  /// Config file (default: ~/.config/hashvault/config.toml)
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Server address for client commands (default: server.bind from config)
  #[arg(long, global = true, value_name = "HOST:PORT")]
  addr: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Show the effective configuration
  #[command(long_about = "Show the current effective configuration.\n\n\
    Displays which config file is being used and its contents as TOML.")]
  Show,

  /// Write a default config file
  #[command(long_about = "Write the default configuration template.\n\n\
    Targets ~/.config/hashvault/config.toml, or the path given with --config.")]
  Init {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
}

#[derive(Subcommand)]
enum Commands {
  /// Run the HTTP server in the foreground
  Serve {
    /// Address to bind, overrides server.bind
    #[arg(long)]
    bind: Option<String>,
    /// Delay before a digest becomes visible, overrides server.hash_delay_ms
    #[arg(long)]
    hash_delay_ms: Option<u64>,
  },
  /// Submit a password and print its id
  Hash { password: String },
  /// Print the digest stored under an id
  Get { id: u64 },
  /// Show request statistics
  Stats {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Ask a running server to drain and exit
  Shutdown,
  /// Compute a digest locally without a server
  Digest { plaintext: String },
  /// Manage configuration
  #[command(after_help = "\
CONFIG LOCATIONS:
  User:    ~/.config/hashvault/config.toml
  Custom:  --config <FILE>")]
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let config_path = cli.config.as_deref();

  // The server configures its own logging once the config is loaded
  if !matches!(cli.command, Commands::Serve { .. }) {
    init_cli_logging();
  }

  match cli.command {
    Commands::Serve { bind, hash_delay_ms } => {
      let mut runtime_config = RuntimeConfig::load(config_path).context("Failed to load config")?;
      apply_overrides(&mut runtime_config.config, bind, hash_delay_ms);

      // Keep the guard alive so buffered file logs are flushed on exit
      let _guard = init_server_logging(&runtime_config.config.daemon);
      cmd_serve(runtime_config).await
    }
    Commands::Hash { password } => cmd_hash(&client_addr(cli.addr, config_path)?, &password).await,
    Commands::Get { id } => cmd_get(&client_addr(cli.addr, config_path)?, id).await,
    Commands::Stats { json } => cmd_stats(&client_addr(cli.addr, config_path)?, json).await,
    Commands::Shutdown => cmd_shutdown(&client_addr(cli.addr, config_path)?).await,
    Commands::Digest { plaintext } => cmd_digest(&plaintext),
    Commands::Config { command } => match command {
      ConfigCommand::Show => cmd_config_show(config_path),
      ConfigCommand::Init { force } => cmd_config_init(config_path, force),
    },
  }
}

/// `--addr` if given, otherwise the configured bind address
fn client_addr(explicit: Option<String>, config_path: Option<&Path>) -> Result<String> {
  match explicit {
    Some(addr) => Ok(addr),
    None => Ok(Config::load(config_path).context("Failed to load config")?.server.bind),
  }
}
