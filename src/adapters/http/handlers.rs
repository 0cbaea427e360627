//! Request handlers for the proxy routes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::{error, warn};

use super::server::AppState;
use super::types::{
    AckResponse, ApiError, AssignRequest, AssignResponse, FlowEventRequest, HealthResponse,
    HistoryQuery, HistoryResponse, QueueQuery, QueueResponse,
};
use crate::domain::errors::CherryPickerError;
use crate::services::ClaimRequest;

pub const BANNER: &str = "Cherry Picker backend, live queue only.";
pub const HEALTH_MESSAGE: &str = "Cherry Picker backend healthy";

const QUEUE_FAILED: &str = "Failed to fetch queue tasks from upstream";
const HISTORY_FAILED: &str = "Failed to fetch task history from upstream";
const ASSIGN_FAILED: &str = "Failed to assign task upstream";
const FLOW_EVENT_FAILED: &str = "Failed to record flow event";

fn fail(action: &'static str) -> impl FnOnce(CherryPickerError) -> ApiError {
    move |err| {
        if err.is_validation() {
            warn!(action, error = %err, "rejected request");
        } else {
            error!(action, error = %err, "request failed");
        }
        ApiError::new(action, err)
    }
}

/// An empty body reads as all-defaults so the services report the missing
/// field instead of a content-type rejection.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, CherryPickerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => {
            CherryPickerError::validation(format!("request body has an invalid field: {e}"))
        }
        Category::Io | Category::Syntax | Category::Eof => {
            CherryPickerError::validation(format!("request body is not valid JSON: {e}"))
        }
    })
}

pub async fn banner() -> &'static str {
    BANNER
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: HEALTH_MESSAGE.to_string(),
        flow_events: state.flow_store.len().await,
    })
}

pub async fn list_queue(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<QueueResponse>, ApiError> {
    let tasks = state
        .queue
        .list_queued(query.queue_id.as_deref())
        .await
        .map_err(fail(QUEUE_FAILED))?;
    Ok(Json(QueueResponse { tasks }))
}

pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let hours = query.window_hours().map_err(fail(HISTORY_FAILED))?;
    let tasks = state
        .history
        .list_history(hours, query.queue_id.as_deref())
        .await
        .map_err(fail(HISTORY_FAILED))?;
    Ok(Json(HistoryResponse { tasks }))
}

pub async fn assign_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    body: Bytes,
) -> Result<Json<AssignResponse>, ApiError> {
    let request: AssignRequest = parse_body(&body).map_err(fail(ASSIGN_FAILED))?;
    let result = state
        .assignment
        .assign(&task_id, &ClaimRequest::from(request))
        .await
        .map_err(fail(ASSIGN_FAILED))?;
    Ok(Json(AssignResponse { ok: true, result }))
}

pub async fn record_flow_event(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AckResponse>, ApiError> {
    let request: FlowEventRequest = parse_body(&body).map_err(fail(FLOW_EVENT_FAILED))?;
    state
        .flow_store
        .record(request.task_id.as_deref(), request.event)
        .await
        .map_err(fail(FLOW_EVENT_FAILED))?;
    Ok(Json(AckResponse { ok: true }))
}
