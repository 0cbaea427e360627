use async_trait::async_trait;

use crate::domain::models::{HistoryTask, NormalizedTask};

/// Source of the task lists the widget renders.
///
/// Implemented over HTTP by
/// [`BackendClient`](crate::adapters::backend_client::BackendClient).
#[async_trait]
pub trait TaskFeed: Send + Sync {
    /// Tasks currently waiting in `queue_id`.
    async fn queue(&self, queue_id: &str) -> anyhow::Result<Vec<NormalizedTask>>;

    /// Finished tasks over the trailing `hours`.
    async fn history(&self, hours: u32, queue_id: Option<&str>) -> anyhow::Result<Vec<HistoryTask>>;
}
