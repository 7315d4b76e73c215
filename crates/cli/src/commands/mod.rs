//! CLI command implementations

mod client;
mod config;
mod digest;
mod serve;

pub use client::{cmd_get, cmd_hash, cmd_shutdown, cmd_stats};
pub use config::{cmd_config_init, cmd_config_show};
pub use digest::cmd_digest;
pub use serve::{apply_overrides, cmd_serve};
