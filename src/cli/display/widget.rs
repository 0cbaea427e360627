//! Rendering of the queue watcher screen.

use chrono::{DateTime, Utc};
use console::style;
use serde_json::Value;

use super::table::{list_table, render_section};
use crate::domain::models::{HistoryTask, NormalizedTask};

pub const QUEUE_HEADERS: [&str; 6] = ["Task ID", "Caller ID", "ANI", "DNIS", "Queue", "Created"];
pub const HISTORY_HEADERS: [&str; 7] = ["Task ID", "Caller ID", "ANI", "DNIS", "Queue", "Started", "Ended"];

pub const EMPTY_QUEUE: &str = "No tasks currently in queue.";

pub fn empty_history(hours: u32) -> String {
    format!("No tasks in last {hours} hours.")
}

/// Render an upstream timestamp: epoch milliseconds or an RFC 3339 string
/// become `YYYY-MM-DD HH:MM:SS UTC`; anything else is shown as-is.
pub fn format_timestamp(value: Option<&Value>) -> String {
    let parsed = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(_) => None,
    };
    match (parsed, value) {
        (Some(dt), _) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        (None, Some(Value::String(s))) => s.clone(),
        (None, Some(other)) => other.to_string(),
        (None, None) => String::new(),
    }
}

fn cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn task_cells(task: &NormalizedTask) -> Vec<String> {
    vec![
        cell(task.id.as_deref()),
        cell(task.caller_id.as_deref()),
        cell(task.ani.as_deref()),
        cell(task.dnis.as_deref()),
        cell(task.queue_id.as_deref()),
    ]
}

pub fn queue_table(tasks: &[NormalizedTask]) -> String {
    let mut table = list_table(&QUEUE_HEADERS);
    for task in tasks {
        let mut row = task_cells(task);
        row.push(format_timestamp(task.created_time.as_ref()));
        table.add_row(row);
    }
    render_section("Queue", table, tasks.len(), EMPTY_QUEUE)
}

pub fn history_table(tasks: &[HistoryTask], hours: u32) -> String {
    let mut table = list_table(&HISTORY_HEADERS);
    for entry in tasks {
        let mut row = task_cells(&entry.task);
        row.push(format_timestamp(entry.task.created_time.as_ref()));
        row.push(format_timestamp(entry.end_time.as_ref()));
        table.add_row(row);
    }
    render_section("History", table, tasks.len(), &empty_history(hours))
}

pub fn error_banner(message: &str) -> String {
    style(format!("\u{2717} {message}")).red().bold().to_string()
}

pub fn notice_banner(message: &str) -> String {
    style(format!("\u{2713} {message}")).green().bold().to_string()
}

/// Everything the watcher shows on one screen.
#[derive(Debug, Default)]
pub struct WidgetView {
    pub agent_id: Option<String>,
    pub queue_id: Option<String>,
    pub history_hours: u32,
    pub queue: Vec<NormalizedTask>,
    pub history: Vec<HistoryTask>,
    pub updated_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl WidgetView {
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("{}", style("Cherry Picker").bold().underlined()),
            format!(
                "Agent: {}   Queue: {}   Updated: {}",
                self.agent_id.as_deref().unwrap_or("(unknown)"),
                self.queue_id.as_deref().unwrap_or("(not set)"),
                self.updated_at
                    .map(|t| t.format("%H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ];

        if let Some(error) = &self.error {
            lines.push(error_banner(error));
        }
        if let Some(notice) = &self.notice {
            lines.push(notice_banner(notice));
        }

        lines.push(String::new());
        lines.push(queue_table(&self.queue));
        lines.push(String::new());
        lines.push(history_table(&self.history, self.history_hours));
        lines.push(String::new());
        lines.push(
            style("Type a task id (or row number) and Enter to claim, r to refresh, q to quit.")
                .dim()
                .to_string(),
        );
        lines.join("\n")
    }

    /// Resolve what the operator typed to a queued task id: a 1-based row
    /// number or a task id shown in the queue table.
    pub fn resolve_task(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if let Ok(row) = input.parse::<usize>() {
            if let Some(task) = row.checked_sub(1).and_then(|i| self.queue.get(i)) {
                return task.id.clone();
            }
        }
        self.queue
            .iter()
            .filter_map(|t| t.id.as_deref())
            .find(|id| *id == input)
            .map(str::to_string)
    }
}
