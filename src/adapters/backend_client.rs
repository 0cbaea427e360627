//! Client for the proxy's own `/api` surface, used by the terminal widget
//! and the one-shot CLI commands.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::adapters::http::types::{
    AssignResponse, ErrorResponse, HealthResponse, HistoryResponse, QueueResponse,
};
use crate::domain::models::{HistoryTask, NormalizedTask, WidgetConfig};
use crate::domain::ports::TaskFeed;
use crate::services::query_contract::encode_path_segment;

/// Default request timeout for widget calls
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The proxy answered non-2xx; `message` is its `error` field.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        upstream_status: Option<Value>,
    },

    #[error("Cannot reach backend: {0}")]
    Transport(String),

    #[error("Unexpected response from backend: {0}")]
    Decode(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimBody<'a> {
    agent_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    api_base: String,
}

impl BackendClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, BackendError> {
        Self::new(config.api_base.clone(), Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub async fn fetch_queue(&self, queue_id: &str) -> Result<Vec<NormalizedTask>, BackendError> {
        let resp = self
            .http
            .get(format!("{}/tasks/queue", self.api_base))
            .query(&[("queueId", queue_id)])
            .send()
            .await
            .map_err(transport)?;
        let body: QueueResponse = decode(resp).await?;
        Ok(body.tasks)
    }

    pub async fn fetch_history(
        &self,
        hours: u32,
        queue_id: Option<&str>,
    ) -> Result<Vec<HistoryTask>, BackendError> {
        let mut query = vec![("hours", hours.to_string())];
        if let Some(queue_id) = queue_id {
            query.push(("queueId", queue_id.to_string()));
        }
        let resp = self
            .http
            .get(format!("{}/tasks/history", self.api_base))
            .query(&query)
            .send()
            .await
            .map_err(transport)?;
        let body: HistoryResponse = decode(resp).await?;
        Ok(body.tasks)
    }

    /// Claim `task_id` for `agent_id` and return the upstream result.
    pub async fn claim(
        &self,
        task_id: &str,
        agent_id: &str,
        device_id: Option<&str>,
    ) -> Result<Value, BackendError> {
        let url = format!("{}/tasks/{}/assign", self.api_base, encode_path_segment(task_id));
        debug!(%url, agent_id, "claiming task");
        let resp = self
            .http
            .post(url)
            .json(&ClaimBody { agent_id, device_id })
            .send()
            .await
            .map_err(transport)?;
        let body: AssignResponse = decode(resp).await?;
        Ok(body.result)
    }

    pub async fn health(&self) -> Result<HealthResponse, BackendError> {
        let resp = self
            .http
            .get(format!("{}/health", self.api_base))
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }
}

#[async_trait]
impl TaskFeed for BackendClient {
    async fn queue(&self, queue_id: &str) -> anyhow::Result<Vec<NormalizedTask>> {
        Ok(self.fetch_queue(queue_id).await?)
    }

    async fn history(&self, hours: u32, queue_id: Option<&str>) -> anyhow::Result<Vec<HistoryTask>> {
        Ok(self.fetch_history(hours, queue_id).await?)
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, BackendError> {
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(transport)?;

    if !status.is_success() {
        let (message, upstream_status) = match serde_json::from_slice::<ErrorResponse>(&bytes) {
            Ok(body) => (body.error, body.status),
            Err(_) => (format!("Backend returned {status}"), None),
        };
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
            upstream_status,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
}
