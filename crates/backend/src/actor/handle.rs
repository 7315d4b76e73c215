//! Actor handles for communicating with actors
//!
//! Handles are cheap to clone and provide a way to send messages to actors.
//! They encapsulate the channel sender and turn the reply channels into
//! plain async request/response calls.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::message::{HashId, HashMessage, Reservation, StatsMessage, StatsSnapshot, StorePhase};

// ============================================================================
// Hash Store Handle
// ============================================================================

/// Handle to communicate with a HashStoreActor
#[derive(Clone, Debug)]
pub struct HashStoreHandle {
  tx: mpsc::Sender<HashMessage>,
}

impl HashStoreHandle {
  /// Create a new handle from a sender
  pub fn new(tx: mpsc::Sender<HashMessage>) -> Self {
    Self { tx }
  }

  /// Reserve an identifier for `plaintext`.
  ///
  /// Returns as soon as the store has assigned the id; the digest itself is
  /// computed later by the scheduler.
  pub async fn reserve(&self, plaintext: impl Into<String>) -> Result<Reservation, SendError> {
    let plaintext = plaintext.into();
    self.request(|reply| HashMessage::Reserve { plaintext, reply }).await
  }

  /// Fetch the digest for `id`.
  ///
  /// `None` covers both unknown ids and ids whose digest is still pending.
  pub async fn retrieve(&self, id: HashId) -> Result<Option<String>, SendError> {
    self.request(|reply| HashMessage::Retrieve { id, reply }).await
  }

  /// Ask the store to stop accepting reservations.
  ///
  /// Returns the phase right after the request was processed: `Terminated`
  /// when nothing was in flight, `Draining` otherwise. Safe to call repeatedly.
  pub async fn request_shutdown(&self) -> Result<StorePhase, SendError> {
    self.request(|reply| HashMessage::Shutdown { reply }).await
  }

  #[cfg(test)]
  pub(super) fn sender(&self) -> &mpsc::Sender<HashMessage> {
    &self.tx
  }

  async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> HashMessage) -> Result<T, SendError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    self.tx.send(build(reply_tx)).await.map_err(|_| SendError::ActorGone)?;
    reply_rx.await.map_err(|_| SendError::ActorGone)
  }
}

// ============================================================================
// Stats Handle
// ============================================================================

/// Handle to communicate with a StatsActor
///
/// Recording is fire-and-forget; only `snapshot` waits for a reply.
#[derive(Clone, Debug)]
pub struct StatsHandle {
  tx: mpsc::Sender<StatsMessage>,
}

impl StatsHandle {
  /// Create a new handle from a sender
  pub fn new(tx: mpsc::Sender<StatsMessage>) -> Self {
    Self { tx }
  }

  /// Record one completed request
  pub async fn record(&self, latency: Duration) -> Result<(), SendError> {
    self
      .tx
      .send(StatsMessage::Record { latency })
      .await
      .map_err(|_| SendError::ActorGone)
  }

  /// Record from a spawned task so the caller never waits on the stats mailbox
  pub fn record_detached(&self, latency: Duration) {
    let handle = self.clone();
    tokio::spawn(async move {
      if let Err(e) = handle.record(latency).await {
        debug!(error = %e, "Dropped request latency sample");
      }
    });
  }

  /// Read the current totals
  pub async fn snapshot(&self) -> Result<StatsSnapshot, SendError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    self
      .tx
      .send(StatsMessage::Retrieve { reply: reply_tx })
      .await
      .map_err(|_| SendError::ActorGone)?;
    reply_rx.await.map_err(|_| SendError::ActorGone)
  }
}

// ============================================================================
// Errors
// ============================================================================

/// Error when sending to an actor
#[derive(Debug, Clone, thiserror::Error)]
pub enum SendError {
  #[error("Actor has shut down")]
  ActorGone,
}
