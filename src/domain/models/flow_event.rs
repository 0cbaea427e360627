//! Call-flow metadata pushed by the routing script before a task is queued.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields accepted from the flow-event hook, keyed elsewhere by task id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEventInput {
    #[serde(default)]
    pub interaction_id: Option<String>,
    #[serde(default)]
    pub caller_id: Option<String>,
    #[serde(default)]
    pub queue_id: Option<String>,
    #[serde(default)]
    pub extra: Option<Value>,
}

/// Stored metadata for one task.
///
/// `lookup` of an unknown task returns [`FlowMetadata::default`], whose
/// fields are all `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetadata {
    pub interaction_id: Option<String>,
    pub caller_id: Option<String>,
    pub queue_id: Option<String>,
    pub extra: Option<Value>,
    pub received_at: Option<DateTime<Utc>>,
}

impl FlowMetadata {
    /// Build an entry from hook input, dropping empty strings and JSON nulls.
    pub fn from_input(input: FlowEventInput, received_at: DateTime<Utc>) -> Self {
        Self {
            interaction_id: non_empty(input.interaction_id),
            caller_id: non_empty(input.caller_id),
            queue_id: non_empty(input.queue_id),
            extra: input.extra.filter(|v| !v.is_null()),
            received_at: Some(received_at),
        }
    }

    /// True for the placeholder returned on a lookup miss.
    pub fn is_empty(&self) -> bool {
        self.received_at.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
