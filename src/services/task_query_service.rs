//! Live queue view: tasks currently waiting in one queue.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use tracing::{debug, info, instrument};

use crate::domain::errors::{CherryPickerError, CherryPickerResult};
use crate::domain::models::{unwrap_task_envelope, NormalizedTask};
use crate::domain::ports::UpstreamApi;

use super::flow_metadata_store::FlowMetadataStore;
use super::query_contract::QueryContract;

pub struct TaskQueryService {
    upstream: Arc<dyn UpstreamApi>,
    flow_store: Arc<FlowMetadataStore>,
    contract: QueryContract,
}

impl TaskQueryService {
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

    /// Tasks in `queue_id` (case-insensitive) whose state is `QUEUED` or
    /// `IN_QUEUE`, over the trailing queue window, in upstream order.
    #[instrument(skip(self))]
    pub async fn list_queued(&self, queue_id: Option<&str>) -> CherryPickerResult<Vec<NormalizedTask>> {
        let queue_id = queue_id
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| CherryPickerError::validation("queueId is required"))?;

        let options = self.contract.queue_options(Utc::now());
        debug!(params = ?options.params, "querying upstream tasks");

        let payload = self
            .upstream
            .request(Method::GET, &self.contract.tasks_path, options)
            .await?;

        let raw_tasks = unwrap_task_envelope(payload);
        let raw_count = raw_tasks.len();

        let mut tasks = Vec::new();
        for raw in raw_tasks
            .iter()
            .filter(|t| t.in_queue(queue_id) && t.is_queued())
        {
            let meta = match raw.id() {
                Some(id) => self.flow_store.lookup(&id).await,
                None => Default::default(),
            };
            tasks.push(raw.normalize(Some(queue_id), &meta));
        }

        info!(queue_id, raw_count, queued = tasks.len(), "listed queued tasks");
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_upstream::{MockReply, MockUpstream};
    use crate::domain::errors::UpstreamStatus;
    use crate::domain::models::{FlowEventInput, UpstreamConfig};
    use serde_json::json;

    fn service(mock: Arc<MockUpstream>, store: Arc<FlowMetadataStore>) -> TaskQueryService {
        let config = UpstreamConfig {
            org_id: "org-1".to_string(),
            ..Default::default()
        };
        TaskQueryService::new(mock, store, QueryContract::from_config(&config))
    }

    #[tokio::test]
    async fn test_missing_queue_id_is_validation_error_without_upstream_call() {
        let mock = Arc::new(MockUpstream::new());
        let svc = service(mock.clone(), Arc::new(FlowMetadataStore::new()));

        assert!(svc.list_queued(None).await.unwrap_err().is_validation());
        assert!(svc.list_queued(Some("")).await.unwrap_err().is_validation());
        assert_eq!(mock.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_single_queued_task_end_to_end() {
        let mock = Arc::new(MockUpstream::returning(json!({
            "tasks": [{"id": "T1", "queueId": "Sales", "state": "QUEUED", "ani": "+15551234567"}]
        })));
        let svc = service(mock.clone(), Arc::new(FlowMetadataStore::new()));

        let tasks = svc.list_queued(Some("Sales")).await.unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id.as_deref(), Some("T1"));
        assert_eq!(tasks[0].ani.as_deref(), Some("+15551234567"));
        assert_eq!(tasks[0].caller_id.as_deref(), Some("+15551234567"));

        let calls = mock.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::GET);
        assert_eq!(calls[0].path, "/tasks");
        assert_eq!(calls[0].options.param_value("orgId"), Some("org-1"));
        assert_eq!(calls[0].options.param_value("channelTypes"), Some("telephony"));
    }

    #[tokio::test]
    async fn test_queue_match_is_case_insensitive() {
        let mock = Arc::new(MockUpstream::returning(json!({
            "tasks": [
                {"id": "A", "queueId": "sales", "state": "QUEUED"},
                {"id": "B", "queueId": "support", "state": "QUEUED"}
            ]
        })));
        let svc = service(mock, Arc::new(FlowMetadataStore::new()));

        let tasks = svc.list_queued(Some("Sales")).await.unwrap();
        let ids: Vec<_> = tasks.iter().filter_map(|t| t.id.as_deref()).collect();
        assert_eq!(ids, vec!["A"]);
    }

    #[tokio::test]
    async fn test_only_queued_states_survive_in_upstream_order() {
        let mock = Arc::new(MockUpstream::returning(json!({
            "items": [
                {"taskId": "3", "queueName": "Sales", "status": "in_queue"},
                {"id": "1", "queueId": "Sales", "state": "CONNECTED"},
                {"id": "2", "queue": "SALES", "state": "queued"},
                {"id": "4", "queueId": "Sales"}
            ]
        })));
        let svc = service(mock, Arc::new(FlowMetadataStore::new()));

        let tasks = svc.list_queued(Some("Sales")).await.unwrap();
        let ids: Vec<_> = tasks.iter().filter_map(|t| t.id.as_deref()).collect();
        assert_eq!(ids, vec!["3", "2"]);
        for task in &tasks {
            let state = task.state.clone().unwrap_or_default().to_uppercase();
            assert!(state == "QUEUED" || state == "IN_QUEUE");
        }
        // Tasks without a queueId field report the requested queue.
        assert_eq!(tasks[0].queue_id.as_deref(), Some("Sales"));
    }

    #[tokio::test]
    async fn test_enriches_caller_id_from_flow_metadata() {
        let store = Arc::new(FlowMetadataStore::new());
        store
            .record(
                Some("T1"),
                FlowEventInput {
                    caller_id: Some("VIP Customer".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let mock = Arc::new(MockUpstream::returning(json!([
            {"id": "T1", "queueId": "Sales", "state": "QUEUED", "ani": "+1000"},
            {"id": "T2", "queueId": "Sales", "state": "QUEUED"}
        ])));
        let svc = service(mock, store);

        let tasks = svc.list_queued(Some("Sales")).await.unwrap();
        assert_eq!(tasks[0].caller_id.as_deref(), Some("VIP Customer"));
        assert_eq!(tasks[0].ani.as_deref(), Some("+1000"));
        assert_eq!(tasks[1].caller_id, None);
    }

    #[tokio::test]
    async fn test_unrecognized_payload_yields_empty_list() {
        let mock = Arc::new(MockUpstream::returning(json!({"data": "nothing"})));
        let svc = service(mock, Arc::new(FlowMetadataStore::new()));
        assert!(svc.list_queued(Some("Sales")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let mock = Arc::new(MockUpstream::always(MockReply::Status {
            status: 401,
            details: json!({"error": "unauthorized"}),
        }));
        let svc = service(mock, Arc::new(FlowMetadataStore::new()));

        let err = svc.list_queued(Some("Sales")).await.unwrap_err();
        match err {
            CherryPickerError::Upstream { status, details } => {
                assert_eq!(status, UpstreamStatus::Http(401));
                assert_eq!(details["error"], "unauthorized");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
