//! Actor-based stores
//!
//! Instead of shared-state concurrency with `Arc<Mutex<...>>`, each store runs
//! as a long-lived task that exclusively owns its state and processes one
//! message at a time from a bounded `mpsc` mailbox.
//!
//! # Actors
//!
//! - [`HashStoreActor`]: hands out sequential ids, merges digests, drives the
//!   drain-based shutdown
//! - [`StatsActor`]: counts requests and sums their latency
//!
//! # Flow
//!
//! ```text
//! HTTP handlers ──Reserve/Retrieve/Shutdown──▶ HashStoreActor ──fire──▶ ShutdownSignal
//!                                                 │    ▲
//!                                        schedule │    │ Merge (after delay)
//!                                                 ▼    │
//!                                             DigestScheduler
//!
//! HTTP handlers ──Record/Retrieve──▶ StatsActor
//! ```
//!
//! Request/response calls use `oneshot` reply channels; see [`handle`] for
//! the typed wrappers.

pub mod handle;
mod hashes;
pub mod lifecycle;
pub mod message;
mod scheduler;
mod stats;


pub use hashes::{HashStoreActor, HashStoreConfig};
pub use scheduler::{DigestScheduler, Scheduled};
pub use stats::StatsActor;
