//! Wire types of the proxy's HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::errors::CherryPickerError;
use crate::domain::models::{FlowEventInput, HistoryTask, NormalizedTask};
use crate::services::ClaimRequest;

/// Query parameters of `GET /api/tasks/queue`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueQuery {
    #[serde(default)]
    pub queue_id: Option<String>,
}

/// Query parameters of `GET /api/tasks/history`.
///
/// `hours` stays a string so a non-numeric value is reported with the
/// same `{error}` body as an out-of-range one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub queue_id: Option<String>,
}

impl HistoryQuery {
    pub fn window_hours(&self) -> Result<Option<u32>, CherryPickerError> {
        match self.hours.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<u32>()
                .map(Some)
                .map_err(|_| CherryPickerError::validation(format!("hours must be a whole number, got '{raw}'"))),
        }
    }
}

/// Body of `POST /api/tasks/{taskId}/assign`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignRequest {
    pub agent_id: Option<String>,
    pub device_id: Option<String>,
    pub org_id: Option<String>,
}

impl From<AssignRequest> for ClaimRequest {
    fn from(req: AssignRequest) -> Self {
        Self {
            agent_id: req.agent_id,
            device_id: req.device_id,
            org_id: req.org_id,
        }
    }
}

/// Body of `POST /api/flow-events`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowEventRequest {
    #[serde(deserialize_with = "string_or_number")]
    pub task_id: Option<String>,
    #[serde(flatten)]
    pub event: FlowEventInput,
}

/// Flow hooks may send numeric ids; they are stored as their decimal text.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueueResponse {
    pub tasks: Vec<NormalizedTask>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub tasks: Vec<HistoryTask>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignResponse {
    pub ok: bool,
    pub result: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
    /// Tasks with flow metadata currently held in memory.
    #[serde(default)]
    pub flow_events: usize,
}

/// Error body. `status` and `details` are present for upstream-side
/// failures only.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

const MALFORMED_DETAILS: &str =
    "Upstream returned a response that is not valid JSON; inspect the proxy logs for the raw body";

/// A domain error tagged with what the handler was trying to do.
#[derive(Debug)]
pub struct ApiError {
    action: &'static str,
    source: CherryPickerError,
}

impl ApiError {
    pub fn new(action: &'static str, source: CherryPickerError) -> Self {
        Self { action, source }
    }

    fn into_parts(self) -> (StatusCode, ErrorResponse) {
        match self.source {
            CherryPickerError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    status: None,
                    details: None,
                },
            ),
            CherryPickerError::Upstream { status, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: self.action.to_string(),
                    status: Some(status.to_json()),
                    details: Some(details),
                },
            ),
            CherryPickerError::Auth(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: self.action.to_string(),
                    status: Some(Value::from(StatusCode::INTERNAL_SERVER_ERROR.as_u16())),
                    details: Some(Value::String(format!("Authentication with upstream failed: {message}"))),
                },
            ),
            CherryPickerError::MalformedResponse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: self.action.to_string(),
                    status: Some(Value::from(StatusCode::INTERNAL_SERVER_ERROR.as_u16())),
                    details: Some(Value::from(MALFORMED_DETAILS)),
                },
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();
        (status, Json(body)).into_response()
    }
}
