//! StatsActor - request count and summed latency

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{
  handle::StatsHandle,
  message::{StatsMessage, StatsSnapshot},
};

/// The stats actor
///
/// Both totals only ever grow. There is no shutdown-aware behavior: samples
/// still queued when the process exits are simply lost.
pub struct StatsActor {
  count: u64,
  total_latency: Duration,
  rx: mpsc::Receiver<StatsMessage>,
  cancel: CancellationToken,
}

impl StatsActor {
  pub fn new(mailbox_capacity: usize, cancel: CancellationToken) -> (Self, StatsHandle) {
    let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
    let actor = Self {
      count: 0,
      total_latency: Duration::ZERO,
      rx,
      cancel,
    };
    (actor, StatsHandle::new(tx))
  }

  pub fn spawn(mailbox_capacity: usize, cancel: CancellationToken) -> StatsHandle {
    let (actor, handle) = Self::new(mailbox_capacity, cancel);
    tokio::spawn(actor.run());
    handle
  }

  pub async fn run(mut self) {
    info!("StatsActor started");

    loop {
      tokio::select! {
          biased;

          _ = self.cancel.cancelled() => {
              info!("StatsActor shutting down (cancelled)");
              break;
          }

          msg = self.rx.recv() => {
              match msg {
                  Some(msg) => self.handle(msg),
                  None => {
                      info!("StatsActor shutting down (channel closed)");
                      break;
                  }
              }
          }
      }
    }

    info!(count = self.count, "StatsActor stopped");
  }

  fn handle(&mut self, msg: StatsMessage) {
    match msg {
      StatsMessage::Record { latency } => {
        self.count += 1;
        self.total_latency = self.total_latency.saturating_add(latency);
      }
      StatsMessage::Retrieve { reply } => {
        if reply.send(self.snapshot()).is_err() {
          debug!("Stats caller went away");
        }
      }
    }
  }

  fn snapshot(&self) -> StatsSnapshot {
    StatsSnapshot {
      count: self.count,
      total_latency_micros: u64::try_from(self.total_latency.as_micros()).unwrap_or(u64::MAX),
    }
  }
}
