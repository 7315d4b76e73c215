//! Actor message types for the hash and stats stores
//!
//! Every request that expects an answer carries a `oneshot::Sender` for its
//! reply. Fire-and-forget messages (`Merge`, `Record`) carry none.

use std::time::Duration;

use tokio::sync::oneshot;

use crate::digest;

/// Identifier handed out for an accepted reservation (starts at 1)
pub type HashId = u64;

// ============================================================================
// Hash Store Messages
// ============================================================================

/// A message for the HashStoreActor
#[derive(Debug)]
pub enum HashMessage {
  /// Reserve the next identifier for a plaintext
  Reserve {
    plaintext: String,
    reply: oneshot::Sender<Reservation>,
  },
  /// Look up the digest for an identifier
  Retrieve {
    id: HashId,
    reply: oneshot::Sender<Option<String>>,
  },
  /// Stop accepting reservations and drain the in-flight ones
  Shutdown { reply: oneshot::Sender<StorePhase> },
  /// Computed digest coming back from the scheduler
  Merge(ResolvedDigest),
}

/// Reply to a reservation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
  /// The store accepted the plaintext under this identifier
  Accepted(HashId),
  /// Shutdown has been requested; nothing was reserved
  Rejected,
}

impl Reservation {
  /// The reserved identifier, if accepted
  pub fn id(&self) -> Option<HashId> {
    match self {
      Self::Accepted(id) => Some(*id),
      Self::Rejected => None,
    }
  }
}

/// Lifecycle phase of the hash store
///
/// ```text
/// Accepting --shutdown--> Draining --in_flight == 0--> Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
  Accepting,
  Draining,
  Terminated,
}

impl StorePhase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Accepting => "accepting",
      Self::Draining => "draining",
      Self::Terminated => "terminated",
    }
  }
}

/// A digest computed for a reserved identifier.
///
/// Only the actor module can build one, so a merge can never be forged by
/// code holding a plain `HashStoreHandle`.
#[derive(Debug)]
pub struct ResolvedDigest {
  id: HashId,
  digest: String,
}

impl ResolvedDigest {
  pub(super) fn compute(id: HashId, plaintext: &str) -> Self {
    Self {
      id,
      digest: digest::encode(plaintext),
    }
  }

  pub fn id(&self) -> HashId {
    self.id
  }

  pub(super) fn into_parts(self) -> (HashId, String) {
    (self.id, self.digest)
  }
}

// ============================================================================
// Stats Store Messages
// ============================================================================

/// A message for the StatsActor
#[derive(Debug)]
pub enum StatsMessage {
  /// Account for one completed request
  Record { latency: Duration },
  /// Read the current totals
  Retrieve { reply: oneshot::Sender<StatsSnapshot> },
}

/// Point-in-time totals from the stats store.
///
/// No average is stored; callers divide `total_latency_micros` by `count`
/// themselves when `count > 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
  /// Number of recorded requests
  pub count: u64,
  /// Sum of recorded latencies in microseconds
  pub total_latency_micros: u64,
}
