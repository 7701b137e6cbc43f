//! Cache Group CLI
//!
//! File edge for the schema registry and the upgrade chain: loads JSON,
//! YAML or TOML files, runs one command and renders redacted JSON.

#![warn(unreachable_pub)]

mod cli;

pub mod commands;
pub mod input;
pub mod logging;

// Re-exports
pub use cli::{command, log_format, run};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
