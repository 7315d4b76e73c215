//! Delayed digest computation for the hash store.
//!
//! Each accepted reservation gets its digest computed after the configured
//! delay and merged back through the store's own mailbox. With a zero delay
//! the digest is computed on the spot and handed straight back to the store,
//! which merges it before looking at its next message.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{trace, warn};

use super::message::{HashId, HashMessage, ResolvedDigest};

/// Outcome of scheduling one digest
#[derive(Debug)]
pub enum Scheduled {
  /// Computed synchronously; the store must merge it right away
  Ready(ResolvedDigest),
  /// A delayed task will enqueue the merge later
  Deferred,
}

/// Spawns one tracked task per delayed reservation.
///
/// Only a weak sender is kept here, so the scheduler alone never keeps the
/// store's mailbox open. Each delayed task upgrades it for its own lifetime.
#[derive(Debug)]
pub struct DigestScheduler {
  delay: Duration,
  mailbox: mpsc::WeakSender<HashMessage>,
  tracker: TaskTracker,
}

impl DigestScheduler {
  pub fn new(delay: Duration, mailbox: &mpsc::Sender<HashMessage>) -> Self {
    Self {
      delay,
      mailbox: mailbox.downgrade(),
      tracker: TaskTracker::new(),
    }
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  /// Number of delayed computations that have not merged yet
  pub fn pending(&self) -> usize {
    self.tracker.len()
  }

  /// Tracker for the delayed tasks (closed and awaited by the daemon on exit)
  pub fn tracker(&self) -> TaskTracker {
    self.tracker.clone()
  }

  /// Arrange for the digest of `plaintext` to reach the store.
  pub fn schedule(&self, id: HashId, plaintext: String) -> Scheduled {
    if self.delay.is_zero() {
      return Scheduled::Ready(ResolvedDigest::compute(id, &plaintext));
    }

    // Every external handle is gone; resolve now rather than lose the id.
    let Some(mailbox) = self.mailbox.upgrade() else {
      warn!(id, "Store mailbox unreachable, computing digest immediately");
      return Scheduled::Ready(ResolvedDigest::compute(id, &plaintext));
    };

    let delay = self.delay;
    self.tracker.spawn(async move {
      tokio::time::sleep(delay).await;
      let resolved = ResolvedDigest::compute(id, &plaintext);
      if mailbox.send(HashMessage::Merge(resolved)).await.is_err() {
        warn!(id, "Store stopped before delayed digest could merge");
      } else {
        trace!(id, "Delayed digest enqueued");
      }
    });

    Scheduled::Deferred
  }
}
