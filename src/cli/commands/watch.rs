//! `watch`: the interactive queue widget.
//!
//! Redraws the queue and history tables on every poller event and reads
//! operator commands from stdin, one per line:
//! - a task id or 1-based row number claims that task
//! - `r` (or an empty line) refreshes now
//! - `q` quits
//!
//! With `--json` the screen is replaced by one JSON object per refresh and
//! stdin is not read.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use console::Term;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::adapters::BackendClient;
use crate::application::{PollerConfig, PollerEvent, QueuePoller};
use crate::cli::display::WidgetView;
use crate::domain::models::{Config, WidgetConfig};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Queue to watch (defaults to widget.queue_id)
    #[arg(short, long)]
    pub queue: Option<String>,

    /// Agent that claims tasks (defaults to widget.agent_id)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Device the claimed call is delivered to (defaults to widget.device_id)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Seconds between refreshes (defaults to widget.poll_interval_secs)
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// History window in hours (defaults to widget.history_hours)
    #[arg(long, value_name = "HOURS")]
    pub hours: Option<u32>,
}

impl WatchArgs {
    /// Widget settings with command-line overrides applied.
    pub fn apply(self, base: &WidgetConfig) -> WidgetConfig {
        let mut widget = base.clone();
        if self.queue.is_some() {
            widget.queue_id = self.queue;
        }
        if self.agent.is_some() {
            widget.agent_id = self.agent;
        }
        if self.device.is_some() {
            widget.device_id = self.device;
        }
        if let Some(secs) = self.interval.filter(|s| *s > 0) {
            widget.poll_interval_secs = secs;
        }
        if let Some(hours) = self.hours {
            widget.history_hours = hours;
        }
        widget
    }
}

/// What the loop should do after an operator command.
#[derive(Debug, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    Refresh,
    Redraw,
}

/// Fold a poller event into the view. Returns `false` once the poller is gone.
pub fn apply_event(view: &mut WidgetView, event: Option<PollerEvent>) -> bool {
    match event {
        Some(PollerEvent::Refreshed(snapshot)) => {
            view.queue = snapshot.queue;
            view.history = snapshot.history;
            view.updated_at = Some(snapshot.fetched_at);
            view.error = None;
            true
        }
        Some(PollerEvent::Failed { error }) => {
            view.error = Some(error);
            true
        }
        Some(PollerEvent::Stopped { .. }) | None => false,
    }
}

/// Handle one line typed by the operator.
pub async fn handle_input(
    client: &BackendClient,
    view: &mut WidgetView,
    line: &str,
    device_id: Option<&str>,
) -> InputAction {
    match line.trim() {
        "q" | "quit" => return InputAction::Quit,
        "" | "r" | "refresh" => return InputAction::Refresh,
        _ => {}
    }

    view.notice = None;
    let Some(agent_id) = view.agent_id.clone().filter(|a| !a.trim().is_empty()) else {
        view.error = Some("Missing taskId or agentId".to_string());
        return InputAction::Redraw;
    };
    let Some(task_id) = view.resolve_task(line) else {
        view.error = Some(format!("No queued task matches '{}'", line.trim()));
        return InputAction::Redraw;
    };

    match client.claim(&task_id, &agent_id, device_id).await {
        Ok(_) => {
            view.error = None;
            view.notice = Some(format!("Task {task_id} assigned to {agent_id}"));
            InputAction::Refresh
        }
        Err(e) => {
            view.error = Some(format!("Failed to assign task: {e}"));
            InputAction::Redraw
        }
    }
}

fn redraw(term: &Term, view: &WidgetView, json_mode: bool) -> Result<()> {
    if json_mode {
        let frame = json!({
            "queueId": view.queue_id,
            "queue": view.queue,
            "history": view.history,
            "updatedAt": view.updated_at,
            "error": view.error,
        });
        println!("{frame}");
        return Ok(());
    }
    term.clear_screen().context("Failed to clear terminal")?;
    term.write_line(&view.render())
        .context("Failed to write to terminal")
}

pub async fn execute(args: WatchArgs, config: &Config, json_mode: bool) -> Result<()> {
    let widget = args.apply(&config.widget);
    let client = Arc::new(BackendClient::from_config(&widget)?);

    let mut view = WidgetView {
        agent_id: widget.agent_id.clone(),
        queue_id: widget.queue_id.clone(),
        history_hours: widget.history_hours,
        ..Default::default()
    };
    if widget.queue_id.as_deref().map_or(true, |q| q.trim().is_empty()) {
        view.error = Some("No queue selected: pass --queue or set widget.queue_id".to_string());
    }
    if let Err(e) = client.health().await {
        view.error = Some(format!("Backend health check failed: {e}"));
    }

    let poller = QueuePoller::new(client.clone(), PollerConfig::from(&widget));
    let cancel = poller.cancellation_token();
    let refresh = poller.refresh_handle();
    let (mut events, handle) = poller.spawn();

    let term = Term::stdout();
    let interactive = !json_mode;
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    redraw(&term, &view, json_mode)?;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => {
                if !apply_event(&mut view, event) {
                    break;
                }
            }
            line = input.next_line(), if interactive => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    debug!("stdin closed");
                    break;
                };
                match handle_input(&client, &mut view, &line, widget.device_id.as_deref()).await {
                    InputAction::Quit => break,
                    InputAction::Refresh => refresh.notify_one(),
                    InputAction::Redraw => {}
                }
            }
        }
        redraw(&term, &view, json_mode)?;
    }

    cancel.cancel();
    let _ = handle.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Snapshot, StopReason};
    use crate::domain::models::NormalizedTask;
    use chrono::Utc;
    use mockito::Server;
    use std::time::Duration;

    fn queued(id: &str) -> NormalizedTask {
        NormalizedTask {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn view_with_agent(agent: Option<&str>) -> WidgetView {
        WidgetView {
            agent_id: agent.map(str::to_string),
            queue: vec![queued("T1")],
            history_hours: 24,
            ..Default::default()
        }
    }

    fn client(url: &str) -> BackendClient {
        BackendClient::new(format!("{url}/api"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_args_override_config() {
        let base = WidgetConfig {
            queue_id: Some("Sales".to_string()),
            agent_id: Some("agentA".to_string()),
            ..Default::default()
        };
        let args = WatchArgs {
            queue: Some("Support".to_string()),
            agent: None,
            device: Some("dev-1".to_string()),
            interval: Some(0),
            hours: Some(48),
        };
        let widget = args.apply(&base);
        assert_eq!(widget.queue_id.as_deref(), Some("Support"));
        assert_eq!(widget.agent_id.as_deref(), Some("agentA"));
        assert_eq!(widget.device_id.as_deref(), Some("dev-1"));
        assert_eq!(widget.poll_interval_secs, 10);
        assert_eq!(widget.history_hours, 48);
    }

    #[test]
    fn test_refresh_replaces_lists_and_clears_error() {
        let mut view = view_with_agent(None);
        view.error = Some("Failed to load tasks from backend".to_string());
        let snapshot = Snapshot {
            queue: vec![queued("T2"), queued("T3")],
            history: Vec::new(),
            fetched_at: Utc::now(),
        };
        assert!(apply_event(&mut view, Some(PollerEvent::Refreshed(snapshot))));
        assert_eq!(view.queue.len(), 2);
        assert!(view.error.is_none());
        assert!(view.updated_at.is_some());
    }

    #[test]
    fn test_failure_keeps_previous_lists() {
        let mut view = view_with_agent(None);
        let event = PollerEvent::Failed {
            error: "Failed to load tasks from backend: boom".to_string(),
        };
        assert!(apply_event(&mut view, Some(event)));
        assert_eq!(view.queue.len(), 1);
        assert!(view.error.as_deref().unwrap().contains("boom"));

        let stopped = PollerEvent::Stopped {
            reason: StopReason::Requested,
        };
        assert!(!apply_event(&mut view, Some(stopped)));
        assert!(!apply_event(&mut view, None));
    }

    #[tokio::test]
    async fn test_control_inputs() {
        let c = client("http://127.0.0.1:1");
        let mut view = view_with_agent(Some("agentA"));
        assert_eq!(handle_input(&c, &mut view, "q", None).await, InputAction::Quit);
        assert_eq!(handle_input(&c, &mut view, " r ", None).await, InputAction::Refresh);
        assert_eq!(handle_input(&c, &mut view, "", None).await, InputAction::Refresh);
    }

    #[tokio::test]
    async fn test_claim_without_agent_shows_error() {
        let c = client("http://127.0.0.1:1");
        let mut view = view_with_agent(None);
        assert_eq!(handle_input(&c, &mut view, "1", None).await, InputAction::Redraw);
        assert_eq!(view.error.as_deref(), Some("Missing taskId or agentId"));
    }

    #[tokio::test]
    async fn test_unknown_row_shows_error() {
        let c = client("http://127.0.0.1:1");
        let mut view = view_with_agent(Some("agentA"));
        assert_eq!(handle_input(&c, &mut view, "7", None).await, InputAction::Redraw);
        assert!(view.error.as_deref().unwrap().contains("'7'"));
    }

    #[tokio::test]
    async fn test_successful_claim_requests_refresh() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/tasks/T1/assign")
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .create_async()
            .await;

        let c = client(&server.url());
        let mut view = view_with_agent(Some("agentA"));
        assert_eq!(handle_input(&c, &mut view, "1", None).await, InputAction::Refresh);
        assert_eq!(view.notice.as_deref(), Some("Task T1 assigned to agentA"));
        assert!(view.error.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_claim_shows_backend_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/tasks/T1/assign")
            .with_status(500)
            .with_body(r#"{"error":"Failed to assign task upstream","status":409}"#)
            .create_async()
            .await;

        let c = client(&server.url());
        let mut view = view_with_agent(Some("agentA"));
        assert_eq!(handle_input(&c, &mut view, "T1", None).await, InputAction::Redraw);
        assert_eq!(
            view.error.as_deref(),
            Some("Failed to assign task: Failed to assign task upstream")
        );
    }
}
