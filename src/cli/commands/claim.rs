//! `claim`: assign one task to an agent through the proxy.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::adapters::BackendClient;
use crate::cli::display::notice_banner;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Task to claim
    pub task_id: String,

    /// Agent the task is assigned to (defaults to widget.agent_id)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Device the call is delivered to (defaults to widget.device_id)
    #[arg(short, long)]
    pub device: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutput {
    pub task_id: String,
    pub agent_id: String,
    pub result: Value,
}

impl CommandOutput for ClaimOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![notice_banner(&format!(
            "Task {} assigned to {}",
            self.task_id, self.agent_id
        ))];
        if !self.result.is_null() {
            lines.push(serde_json::to_string_pretty(&self.result).unwrap_or_default());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ClaimArgs, config: &Config, json_mode: bool) -> Result<()> {
    let agent_id = args
        .agent
        .or_else(|| config.widget.agent_id.clone())
        .filter(|a| !a.trim().is_empty())
        .context("Missing taskId or agentId: pass --agent or set widget.agent_id")?;
    let device_id = args.device.or_else(|| config.widget.device_id.clone());

    let client = BackendClient::from_config(&config.widget)?;
    let result = client
        .claim(&args.task_id, &agent_id, device_id.as_deref())
        .await
        .context("Failed to assign task")?;

    output(
        &ClaimOutput {
            task_id: args.task_id,
            agent_id,
            result,
        },
        json_mode,
    );
    Ok(())
}
