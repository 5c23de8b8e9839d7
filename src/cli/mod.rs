//! CLI command handlers
//!
//! Each subcommand is implemented in its own module.

pub mod config;
pub mod hook;
pub mod learnings;
