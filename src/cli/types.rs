//! CLI type definitions
//!
//! Top-level clap structures; each subcommand's arguments live next to its
//! implementation in [`crate::cli::commands`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::{
    claim::ClaimArgs, config::ConfigArgs, history::HistoryArgs, queue::QueueArgs, serve::ServeArgs,
    watch::WatchArgs,
};

#[derive(Parser, Debug)]
#[command(name = "cherry-picker")]
#[command(about = "Cherry Picker - contact-center queue proxy and claim widget", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Read configuration from this file instead of .cherry-picker/
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP proxy in front of the upstream task API
    Serve(ServeArgs),

    /// Watch a queue and claim tasks interactively
    Watch(WatchArgs),

    /// Claim one task for an agent
    Claim(ClaimArgs),

    /// List tasks currently waiting in a queue
    Queue(QueueArgs),

    /// List recently finished tasks
    History(HistoryArgs),

    /// Show the effective configuration (secrets masked)
    Config(ConfigArgs),
}
