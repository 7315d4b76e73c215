//! Domain types shared across the service
//!
//! Currently just configuration; the store types live with their actors.

pub mod config;
