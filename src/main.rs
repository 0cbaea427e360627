//! Cherry Picker CLI entry point.

use std::path::Path;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cherry_picker::cli::commands::{claim, config, history, queue, serve, watch};
use cherry_picker::cli::{handle_error, load_config, Cli, Commands};
use cherry_picker::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let Cli {
        command,
        json,
        config: config_path,
    } = Cli::parse();

    if let Err(err) = run(command, config_path.as_deref(), json).await {
        handle_error(err, json);
    }
}

async fn run(command: Commands, config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    // The proxy logs per its config; widget commands keep stderr quiet so
    // the screen stays readable.
    let _logger = match command {
        Commands::Serve(_) => Some(LoggerImpl::init(&config.logging)?),
        _ => {
            let _ = tracing_subscriber::registry()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init();
            None
        }
    };

    match command {
        Commands::Serve(args) => serve::execute(args, config).await,
        Commands::Watch(args) => watch::execute(args, &config, json).await,
        Commands::Claim(args) => claim::execute(args, &config, json).await,
        Commands::Queue(args) => queue::execute(args, &config, json).await,
        Commands::History(args) => history::execute(args, &config, json).await,
        Commands::Config(args) => config::execute(args, &config, json).await,
    }
}
