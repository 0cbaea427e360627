//! Widget refresh loop.
//!
//! Fetches the queue and history lists on a fixed interval and reports each
//! outcome on a channel:
//! - at most one fetch pair per tick; ticks missed while a fetch is slow are
//!   skipped, not replayed
//! - no fetch while no queue id is configured
//! - an explicit refresh request polls immediately and restarts the interval
//! - stops on cancellation or when the receiver is dropped

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::models::{HistoryTask, NormalizedTask, WidgetConfig};
use crate::domain::ports::TaskFeed;

/// Configuration for the poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between refreshes.
    pub poll_interval: Duration,
    /// Trailing window requested for history.
    pub history_hours: u32,
    /// Queue to watch; polling is idle while unset.
    pub queue_id: Option<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::from(&WidgetConfig::default())
    }
}

impl From<&WidgetConfig> for PollerConfig {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            history_hours: config.history_hours,
            queue_id: config.queue_id.clone(),
        }
    }
}

/// Both lists as of one refresh.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub queue: Vec<NormalizedTask>,
    pub history: Vec<HistoryTask>,
    pub fetched_at: DateTime<Utc>,
}

/// Reason the poller stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired.
    Requested,
    /// The event receiver was dropped.
    ChannelClosed,
}

/// Event emitted by the poller.
#[derive(Debug, Clone)]
pub enum PollerEvent {
    Refreshed(Snapshot),
    Failed { error: String },
    Stopped { reason: StopReason },
}

pub struct QueuePoller {
    feed: Arc<dyn TaskFeed>,
    config: PollerConfig,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
}

impl QueuePoller {
    pub fn new(feed: Arc<dyn TaskFeed>, config: PollerConfig) -> Self {
        Self {
            feed,
            config,
            cancel: CancellationToken::new(),
            refresh: Arc::new(Notify::new()),
        }
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Handle that requests an immediate refresh via `notify_one`.
    pub fn refresh_handle(&self) -> Arc<Notify> {
        self.refresh.clone()
    }

    /// Fetch queue and history once.
    ///
    /// Returns `None` without touching the feed when no queue id is set.
    pub async fn poll_once(&self) -> Option<PollerEvent> {
        let queue_id = self
            .config
            .queue_id
            .as_deref()
            .filter(|q| !q.trim().is_empty())?;

        let result = tokio::try_join!(
            self.feed.queue(queue_id),
            self.feed.history(self.config.history_hours, None),
        );

        Some(match result {
            Ok((queue, history)) => {
                debug!(queue = queue.len(), history = history.len(), "refreshed task lists");
                PollerEvent::Refreshed(Snapshot {
                    queue,
                    history,
                    fetched_at: Utc::now(),
                })
            }
            Err(e) => {
                warn!(error = %e, "failed to load tasks from backend");
                PollerEvent::Failed {
                    error: format!("Failed to load tasks from backend: {e}"),
                }
            }
        })
    }

    /// Spawn the loop, returning the event channel and the task handle.
    pub fn spawn(self) -> (mpsc::Receiver<PollerEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(self.run_loop(tx));
        (rx, handle)
    }

    async fn run_loop(self, tx: mpsc::Sender<PollerEvent>) {
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.config.poll_interval.as_secs_f64(),
            queue_id = ?self.config.queue_id,
            "queue poller started"
        );

        let reason = loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break StopReason::Requested,
                () = tx.closed() => break StopReason::ChannelClosed,
                () = self.refresh.notified() => ticker.reset(),
                _ = ticker.tick() => {}
            }

            let event = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break StopReason::Requested,
                event = self.poll_once() => event,
            };
            if let Some(event) = event {
                if tx.send(event).await.is_err() {
                    break StopReason::ChannelClosed;
                }
            }
        };

        info!(?reason, "queue poller stopped");
        let _ = tx.send(PollerEvent::Stopped { reason }).await;
    }
}
