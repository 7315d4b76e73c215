pub mod actor;
pub mod digest;
pub mod dirs;

mod domain;
pub use domain::config;

mod server;
pub use server::{AppState, StatsReport, router};

mod daemon;
pub use daemon::{Daemon, DaemonError, RuntimeConfig};
