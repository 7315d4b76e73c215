//! Daemon lifecycle management using the actor-based architecture.
//!
//! The daemon is the main entry point for the hashvault process. It starts the
//! store actors, serves HTTP in front of them, and supervises shutdown.
//!
//! # Architecture
//!
//! ```text
//! Daemon (Supervisor)
//!   ├── HTTP server (axum, one task per connection)
//!   ├── HashStoreActor ── DigestScheduler (delayed digest tasks)
//!   └── StatsActor
//! ```
//!
//! # Lifecycle
//!
//! 1. Create master `CancellationToken`
//! 2. Create the shutdown channel and spawn both store actors with child tokens
//! 3. Serve HTTP until the store signals it has drained, or the store dies
//! 4. Stop the HTTP listener gracefully (in-flight requests finish)
//! 5. Cancel the actors and wait briefly for the delayed digest tasks

use std::{path::Path, time::Duration};

use tokio::{net::TcpListener, signal, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
  actor::{
    HashStoreActor, HashStoreConfig, StatsActor,
    handle::HashStoreHandle,
    lifecycle::{ShutdownCause, ShutdownListener, shutdown_channel},
  },
  domain::config::{Config, ConfigError},
  server::{self, AppState},
};

/// How long to wait for delayed digest tasks once the actors are cancelled
const PENDING_GRACE: Duration = Duration::from_secs(1);

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
  #[error("Configuration error: {0}")]
  Config(#[from] ConfigError),
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("Hash store stopped before shutdown completed")]
  StoreCrashed,
}

// ============================================================================
// Configuration
// ============================================================================

/// Daemon runtime configuration.
///
/// Built from the config file; the CLI applies flag overrides on top.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
  pub config: Config,
}

impl RuntimeConfig {
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    Ok(Self {
      config: Config::load(explicit)?,
    })
  }

  fn store_config(&self) -> HashStoreConfig {
    HashStoreConfig {
      hash_delay: self.config.server.hash_delay(),
      mailbox_capacity: self.config.server.mailbox_capacity,
    }
  }
}

/// The hashvault daemon - owns the whole process lifecycle.
///
/// # Usage
///
/// ```ignore
/// let daemon = Daemon::new(RuntimeConfig::load(None)?);
/// daemon.run().await?;
/// ```
pub struct Daemon {
  runtime_config: RuntimeConfig,
}

impl Daemon {
  pub fn new(runtime_config: RuntimeConfig) -> Self {
    Self { runtime_config }
  }

  /// Bind the configured address and serve until shutdown.
  pub async fn run(self) -> Result<(), DaemonError> {
    let addr = self.runtime_config.config.server.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    self.serve(listener).await
  }

  /// Serve on an already-bound listener until shutdown.
  ///
  /// Returns `Ok` after a graceful drain (`POST /shutdown` or ctrl-c) and
  /// `DaemonError::StoreCrashed` if the hash store exits before draining.
  pub async fn serve(self, listener: TcpListener) -> Result<(), DaemonError> {
    let server_config = &self.runtime_config.config.server;
    info!("Starting hashvault");
    if let Ok(addr) = listener.local_addr() {
      info!("Listening on http://{}", addr);
    }
    info!(
      "Hash delay: {}ms, mailbox capacity: {}",
      server_config.hash_delay_ms, server_config.mailbox_capacity
    );

    // Master cancellation token - actors run on a child so the HTTP side
    // can be stopped first.
    let cancel = CancellationToken::new();
    let actors_cancel = cancel.child_token();
    let http_cancel = cancel.child_token();

    let (signal, drained) = shutdown_channel();
    let (store, hashes) = HashStoreActor::new(self.runtime_config.store_config(), signal, actors_cancel.clone());
    let pending = store.scheduler_tracker();
    let store_task = tokio::spawn(store.run());
    let stats = StatsActor::spawn(server_config.mailbox_capacity, actors_cancel);

    let ctrl_c_task = spawn_ctrl_c_handler(hashes.clone());
    let app = server::router(AppState::new(hashes, stats));

    let http = {
      let http_cancel = http_cancel.clone();
      async move {
        let result = axum::serve(listener, app)
          .with_graceful_shutdown(http_cancel.clone().cancelled_owned())
          .await;
        // Listener gone: nothing left to supervise
        http_cancel.cancel();
        result
      }
    };

    let supervisor = supervise(drained, store_task, http_cancel);
    let (served, outcome) = tokio::join!(http, supervisor);

    info!("Shutting down...");
    ctrl_c_task.abort();
    cancel.cancel();

    // After a drain these have all delivered; after a crash they may still be asleep
    pending.close();
    if tokio::time::timeout(PENDING_GRACE, pending.wait()).await.is_err() {
      warn!(abandoned = pending.len(), "Delayed digests abandoned at shutdown");
    }

    if let Err(e) = served {
      warn!("Server error: {}", e);
      outcome?;
      return Err(e.into());
    }
    outcome?;

    info!("Daemon shutdown complete");
    Ok(())
  }
}

/// Wait for the store to drain or die, then stop the HTTP listener.
async fn supervise(
  drained: ShutdownListener,
  mut store_task: JoinHandle<()>,
  http_cancel: CancellationToken,
) -> Result<(), DaemonError> {
  let outcome = tokio::select! {
      cause = drained => match cause {
          ShutdownCause::Drained => {
              info!("Store drained, stopping HTTP listener");
              Ok(())
          }
          ShutdownCause::StoreGone => {
              error!("Hash store dropped its shutdown signal");
              Err(DaemonError::StoreCrashed)
          }
      },
      joined = &mut store_task => {
          match joined {
              Err(e) if e.is_panic() => error!("Hash store panicked"),
              _ => error!("Hash store exited unexpectedly"),
          }
          Err(DaemonError::StoreCrashed)
      }
      _ = http_cancel.cancelled() => Ok(()),
  };

  http_cancel.cancel();
  outcome
}

/// Turn ctrl-c into the same graceful drain as `POST /shutdown`.
fn spawn_ctrl_c_handler(hashes: HashStoreHandle) -> JoinHandle<()> {
  tokio::spawn(async move {
    if let Err(e) = signal::ctrl_c().await {
      warn!("Failed to listen for ctrl-c: {}", e);
      return;
    }
    info!("Received ctrl-c, draining...");
    if let Err(e) = hashes.request_shutdown().await {
      warn!("Failed to request shutdown: {}", e);
    }
  })
}
