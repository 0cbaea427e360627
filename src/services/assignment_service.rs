//! Claims a queued task for an agent.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::errors::{CherryPickerError, CherryPickerResult};
use crate::domain::ports::{RequestOptions, UpstreamApi};

use super::query_contract::QueryContract;

/// Who claims the task and where the call is delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimRequest {
    pub agent_id: Option<String>,
    pub device_id: Option<String>,
    /// Overrides the configured org id when set.
    pub org_id: Option<String>,
}

impl ClaimRequest {
    pub fn for_agent(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}

/// Body posted to the upstream assign endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody<'a> {
    org_id: &'a str,
    agent_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<&'a str>,
}

pub struct AssignmentService {
    upstream: Arc<dyn UpstreamApi>,
    contract: QueryContract,
}

impl AssignmentService {
    pub fn new(upstream: Arc<dyn UpstreamApi>, contract: QueryContract) -> Self {
        Self { upstream, contract }
    }

    /// Assign `task_id` to the requesting agent and return the upstream payload.
    ///
    /// Validation happens before any upstream traffic. A failed claim is not
    /// retried; the caller decides whether to try again.
    #[instrument(skip(self))]
    pub async fn assign(&self, task_id: &str, request: &ClaimRequest) -> CherryPickerResult<Value> {
        if task_id.trim().is_empty() {
            return Err(CherryPickerError::validation("taskId is required"));
        }
        let agent_id = non_blank(request.agent_id.as_deref())
            .ok_or_else(|| CherryPickerError::validation("agentId is required"))?;

        let body = AssignBody {
            org_id: non_blank(request.org_id.as_deref()).unwrap_or(&self.contract.org_id),
            agent_id,
            device_id: non_blank(request.device_id.as_deref()),
        };
        let options = RequestOptions::new().json(serde_json::to_value(&body)?);

        let result = self
            .upstream
            .request(Method::POST, &self.contract.assign_path_for(task_id), options)
            .await?;

        info!(task_id, agent_id, "task assigned");
        Ok(result)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
