//! CLI subcommand implementations.

pub mod claim;
pub mod config;
pub mod history;
pub mod queue;
pub mod serve;
pub mod watch;
