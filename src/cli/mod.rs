//! Command-line interface: the proxy server and the widget-side commands.

pub mod commands;
pub mod display;
pub mod output;
pub mod types;

use std::path::Path;

use anyhow::Result;
use console::style;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

pub use types::{Cli, Commands};

/// Load configuration from `path`, or from the project directory when unset.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Report a failed command and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        eprintln!("{}", serde_json::json!({ "error": format!("{err:#}") }));
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
    }
    std::process::exit(1)
}
