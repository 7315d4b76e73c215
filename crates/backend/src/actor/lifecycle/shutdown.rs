//! One-shot shutdown signal between the hash store and the daemon.
//!
//! The store owns the [`ShutdownSignal`] and fires it when it finishes
//! draining. The daemon owns the [`ShutdownListener`] and starts tearing the
//! HTTP listener down once it resolves.

use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use tokio::sync::oneshot;
use tracing::debug;

/// Create a connected signal/listener pair
pub fn shutdown_channel() -> (ShutdownSignal, ShutdownListener) {
  let (tx, rx) = oneshot::channel();
  (ShutdownSignal { tx }, ShutdownListener { rx })
}

/// Write side, held by the hash store.
///
/// `fire` consumes the signal, so it can be sent at most once.
#[derive(Debug)]
pub struct ShutdownSignal {
  tx: oneshot::Sender<()>,
}

impl ShutdownSignal {
  pub fn fire(self) {
    if self.tx.send(()).is_err() {
      debug!("Shutdown listener already gone");
    }
  }
}

/// Why the listener resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
  /// Shutdown was requested and every in-flight reservation resolved
  Drained,
  /// The store went away without firing (cancelled or crashed)
  StoreGone,
}

/// Read side, held by the process supervisor.
///
/// Await it directly; polling again after it has resolved panics.
#[derive(Debug)]
pub struct ShutdownListener {
  rx: oneshot::Receiver<()>,
}

impl Future for ShutdownListener {
  type Output = ShutdownCause;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    Pin::new(&mut self.rx).poll(cx).map(|result| match result {
      Ok(()) => ShutdownCause::Drained,
      Err(_) => ShutdownCause::StoreGone,
    })
  }
}
