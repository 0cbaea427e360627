//! `history`: list tasks that finished within a trailing window.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::BackendClient;
use crate::cli::display::history_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, HistoryTask};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Window in hours (defaults to widget.history_hours)
    #[arg(long, value_name = "HOURS")]
    pub hours: Option<u32>,

    /// Restrict to one queue; all queues when omitted
    #[arg(short, long)]
    pub queue: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryListOutput {
    pub hours: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_id: Option<String>,
    pub tasks: Vec<HistoryTask>,
}

impl CommandOutput for HistoryListOutput {
    fn to_human(&self) -> String {
        history_table(&self.tasks, self.hours)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: HistoryArgs, config: &Config, json_mode: bool) -> Result<()> {
    let hours = args.hours.unwrap_or(config.widget.history_hours);
    let client = BackendClient::from_config(&config.widget)?;
    let tasks = client
        .fetch_history(hours, args.queue.as_deref())
        .await
        .context("Failed to fetch task history")?;

    output(
        &HistoryListOutput {
            hours,
            queue_id: args.queue,
            tasks,
        },
        json_mode,
    );
    Ok(())
}
