//! `config`: print the effective configuration.

use anyhow::Result;
use clap::Args;
use console::style;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

const MASK: &str = "********";

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also check the upstream settings `serve` requires
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub config: Config,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(skip)]
    pub checked: bool,
}

impl ConfigOutput {
    pub fn new(config: &Config, check: bool) -> Self {
        let problem = if check {
            ConfigLoader::validate(config).err().map(|e| e.to_string())
        } else {
            None
        };
        Self {
            config: mask_secrets(config),
            problem,
            checked: check,
        }
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        let mut text = serde_yaml::to_string(&self.config).unwrap_or_default();
        if self.checked {
            let verdict = match &self.problem {
                Some(problem) => style(format!("\u{2717} {problem}")).red().to_string(),
                None => style("\u{2713} ready to serve").green().to_string(),
            };
            text.push_str(&verdict);
        }
        text
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn mask_secrets(config: &Config) -> Config {
    let mut masked = config.clone();
    if !masked.upstream.client_secret.is_empty() {
        masked.upstream.client_secret = MASK.to_string();
    }
    masked
}

pub async fn execute(args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    let out = ConfigOutput::new(config, args.check);
    output(&out, json_mode);
    if args.check {
        if let Some(problem) = out.problem {
            anyhow::bail!("Configuration is not usable for serve: {problem}");
        }
    }
    Ok(())
}
