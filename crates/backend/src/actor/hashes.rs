//! HashStoreActor - sole owner of the id → digest map
//!
//! The actor hands out sequential identifiers, merges digests computed by the
//! [`DigestScheduler`], answers lookups, and drives the drain-based shutdown:
//!
//! - **Accepting**: reservations succeed
//! - **Draining**: reservations are rejected, pending digests still merge
//! - **Terminated**: the shutdown signal has fired
//!
//! All state lives inside the actor loop; the only way in is the mailbox.

use std::{collections::HashMap, time::Duration};

use tokio::sync::{mpsc, oneshot};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, error, info, trace};

use super::{
  handle::HashStoreHandle,
  lifecycle::ShutdownSignal,
  message::{HashId, HashMessage, Reservation, ResolvedDigest, StorePhase},
  scheduler::{DigestScheduler, Scheduled},
};

/// Configuration for the HashStoreActor
#[derive(Debug, Clone)]
pub struct HashStoreConfig {
  /// Time to wait before a reservation's digest is merged (zero = inline)
  pub hash_delay: Duration,
  /// Bound on queued messages before senders wait
  pub mailbox_capacity: usize,
}

impl Default for HashStoreConfig {
  fn default() -> Self {
    Self {
      hash_delay: Duration::ZERO,
      mailbox_capacity: 100,
    }
  }
}

/// The hash store actor
///
/// # Lifecycle
///
/// The actor runs in a loop until one of:
/// - The CancellationToken is triggered
/// - Every sender (handles and delayed tasks) has been dropped
///
/// Terminating the store's *phase* does not stop the loop; late lookups are
/// still answered until the daemon cancels it.
pub struct HashStoreActor {
  next_id: HashId,
  digests: HashMap<HashId, String>,
  in_flight: usize,
  phase: StorePhase,
  signal: Option<ShutdownSignal>,
  scheduler: DigestScheduler,
  rx: mpsc::Receiver<HashMessage>,
  cancel: CancellationToken,
}

impl HashStoreActor {
  /// Create the actor and its handle.
  ///
  /// The actor is not started until `run()` is called.
  pub fn new(config: HashStoreConfig, signal: ShutdownSignal, cancel: CancellationToken) -> (Self, HashStoreHandle) {
    let (tx, rx) = mpsc::channel(config.mailbox_capacity.max(1));
    let actor = Self {
      next_id: 1,
      digests: HashMap::new(),
      in_flight: 0,
      phase: StorePhase::Accepting,
      signal: Some(signal),
      scheduler: DigestScheduler::new(config.hash_delay, &tx),
      rx,
      cancel,
    };
    (actor, HashStoreHandle::new(tx))
  }

  /// Spawn the actor and return a handle for sending messages
  pub fn spawn(config: HashStoreConfig, signal: ShutdownSignal, cancel: CancellationToken) -> HashStoreHandle {
    let (actor, handle) = Self::new(config, signal, cancel);
    tokio::spawn(actor.run());
    handle
  }

  /// Tracker for the delayed digest tasks
  pub fn scheduler_tracker(&self) -> TaskTracker {
    self.scheduler.tracker()
  }

  /// Main actor loop
  pub async fn run(mut self) {
    info!(delay_ms = self.scheduler.delay().as_millis() as u64, "HashStoreActor started");

    loop {
      tokio::select! {
          biased;

          _ = self.cancel.cancelled() => {
              info!("HashStoreActor shutting down (cancelled)");
              break;
          }

          msg = self.rx.recv() => {
              match msg {
                  Some(msg) => self.handle(msg),
                  None => {
                      info!("HashStoreActor shutting down (channel closed)");
                      break;
                  }
              }
          }
      }
    }

    if self.in_flight > 0 {
      info!(in_flight = self.in_flight, "HashStoreActor stopped with unresolved reservations");
    }
    info!(
      reserved = self.next_id - 1,
      resolved = self.digests.len(),
      "HashStoreActor stopped"
    );
  }

  /// Dispatch a message to the appropriate handler
  fn handle(&mut self, msg: HashMessage) {
    match msg {
      HashMessage::Reserve { plaintext, reply } => self.reserve(plaintext, reply),
      HashMessage::Retrieve { id, reply } => {
        if reply.send(self.digests.get(&id).cloned()).is_err() {
          debug!(id, "Retrieve caller went away");
        }
      }
      HashMessage::Shutdown { reply } => {
        let phase = self.request_shutdown();
        let _ = reply.send(phase);
      }
      HashMessage::Merge(resolved) => self.merge(resolved),
    }
  }

  // ========================================================================
  // Message Handlers
  // ========================================================================

  /// Assign the next id, reply, then schedule the digest.
  ///
  /// The reply goes out before any digest work so hashing latency never sits
  /// on the caller's path.
  fn reserve(&mut self, plaintext: String, reply: oneshot::Sender<Reservation>) {
    if self.phase != StorePhase::Accepting {
      debug!(phase = self.phase.as_str(), "Rejected reservation");
      let _ = reply.send(Reservation::Rejected);
      return;
    }

    let id = self.next_id;
    self.next_id += 1;
    self.in_flight += 1;

    // The id is spent even if the caller stopped listening
    if reply.send(Reservation::Accepted(id)).is_err() {
      debug!(id, "Reserve caller went away");
    }
    trace!(id, in_flight = self.in_flight, "Reserved id");

    match self.scheduler.schedule(id, plaintext) {
      Scheduled::Ready(resolved) => self.merge(resolved),
      Scheduled::Deferred => {}
    }
  }

  /// Store a computed digest and settle one in-flight reservation.
  ///
  /// Panics on a protocol violation (unknown id, double merge); the daemon
  /// treats the resulting actor exit as fatal.
  fn merge(&mut self, resolved: ResolvedDigest) {
    let (id, digest) = resolved.into_parts();

    if id == 0 || id >= self.next_id || self.in_flight == 0 || self.digests.contains_key(&id) {
      error!(
        id,
        next_id = self.next_id,
        in_flight = self.in_flight,
        "Digest merge does not match any pending reservation"
      );
      panic!("invalid digest merge for id {}", id);
    }

    self.digests.insert(id, digest);
    self.in_flight -= 1;
    trace!(id, in_flight = self.in_flight, "Merged digest");

    self.finish_draining();
  }

  /// Leave `Accepting` (once) and terminate immediately if nothing is pending.
  fn request_shutdown(&mut self) -> StorePhase {
    if self.phase == StorePhase::Accepting {
      info!(in_flight = self.in_flight, "Graceful shutdown requested, draining");
      self.phase = StorePhase::Draining;
      self.finish_draining();
    } else {
      debug!(phase = self.phase.as_str(), "Repeated shutdown request ignored");
    }
    self.phase
  }

  /// The single `Draining → Terminated` transition; fires the signal.
  fn finish_draining(&mut self) {
    if self.phase != StorePhase::Draining || self.in_flight > 0 {
      return;
    }

    self.phase = StorePhase::Terminated;
    if let Some(signal) = self.signal.take() {
      info!(resolved = self.digests.len(), "All reservations resolved, signalling shutdown");
      signal.fire();
    }
  }
}
