//! Lifecycle coordination between the stores and the process supervisor.

pub mod shutdown;

pub use shutdown::{ShutdownCause, ShutdownListener, ShutdownSignal, shutdown_channel};
