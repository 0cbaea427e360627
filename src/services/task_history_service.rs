//! Recently finished tasks across the platform.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use tracing::{debug, info, instrument};

use crate::domain::errors::{CherryPickerError, CherryPickerResult};
use crate::domain::models::{unwrap_task_envelope, HistoryTask};
use crate::domain::ports::UpstreamApi;

use super::flow_metadata_store::FlowMetadataStore;
use super::query_contract::QueryContract;

/// Window used when the caller does not pass one.
pub const DEFAULT_HISTORY_HOURS: u32 = 24;

/// Longest window accepted (one week).
pub const MAX_HISTORY_HOURS: u32 = 168;

pub struct TaskHistoryService {
    upstream: Arc<dyn UpstreamApi>,
    flow_store: Arc<FlowMetadataStore>,
    contract: QueryContract,
}

impl TaskHistoryService {
    pub fn new(
        upstream: Arc<dyn UpstreamApi>,
        flow_store: Arc<FlowMetadataStore>,
        contract: QueryContract,
    ) -> Self {
        Self {
            upstream,
            flow_store,
            contract,
        }
    }

    /// Tasks in terminal states over the trailing `window_hours`.
    ///
    /// No local filtering happens; a `queue_id` only scopes the upstream
    /// query.
    #[instrument(skip(self))]
    pub async fn list_history(
        &self,
        window_hours: Option<u32>,
        queue_id: Option<&str>,
    ) -> CherryPickerResult<Vec<HistoryTask>> {
        let hours = window_hours.unwrap_or(DEFAULT_HISTORY_HOURS);
        if hours == 0 || hours > MAX_HISTORY_HOURS {
            return Err(CherryPickerError::validation(format!(
                "hours must be between 1 and {MAX_HISTORY_HOURS}"
            )));
        }
        let queue_id = queue_id.filter(|q| !q.trim().is_empty());

        let options = self.contract.history_options(Utc::now(), hours, queue_id);
        debug!(params = ?options.params, "querying upstream task history");

        let payload = self
            .upstream
            .request(Method::GET, &self.contract.tasks_path, options)
            .await?;

        let mut tasks = Vec::new();
        for raw in unwrap_task_envelope(payload) {
            let meta = match raw.id() {
                Some(id) => self.flow_store.lookup(&id).await,
                None => Default::default(),
            };
            tasks.push(HistoryTask::from_raw(&raw, &meta));
        }

        info!(hours, count = tasks.len(), "listed task history");
        Ok(tasks)
    }
}
