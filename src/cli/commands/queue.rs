//! `queue`: list the tasks waiting in a queue.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::BackendClient;
use crate::cli::display::queue_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, NormalizedTask};

#[derive(Args, Debug)]
pub struct QueueArgs {
    /// Queue to list (defaults to widget.queue_id)
    #[arg(short, long)]
    pub queue: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueListOutput {
    pub queue_id: String,
    pub tasks: Vec<NormalizedTask>,
}

impl CommandOutput for QueueListOutput {
    fn to_human(&self) -> String {
        queue_table(&self.tasks)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: QueueArgs, config: &Config, json_mode: bool) -> Result<()> {
    let queue_id = args
        .queue
        .or_else(|| config.widget.queue_id.clone())
        .filter(|q| !q.trim().is_empty())
        .context("queueId is required: pass --queue or set widget.queue_id")?;

    let client = BackendClient::from_config(&config.widget)?;
    let tasks = client
        .fetch_queue(&queue_id)
        .await
        .context("Failed to fetch queue tasks")?;

    output(&QueueListOutput { queue_id, tasks }, json_mode);
    Ok(())
}
