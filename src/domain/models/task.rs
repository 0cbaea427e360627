//! Upstream task records and the normalized shape served to the widget.
//!
//! The upstream API has shipped several revisions with different field
//! names for the same data. [`RawTask`] reads every known alias in a fixed
//! precedence order so the rest of the crate never deals with the variance:
//!
//! | field            | aliases, first present wins               |
//! |------------------|-------------------------------------------|
//! | id               | `id`, `taskId`                            |
//! | interaction id   | `interactionId`, `interactionIdRef`       |
//! | queue identifier | `queueId`, `queueName`, `queue`           |
//! | channel type     | `channelType`, `channel`                  |
//! | created time     | `createdTime`, `createdAt`                |
//! | end time         | `endTime`, `endedAt`                      |
//! | ani              | `ani`, `fromAddress`, `callerId`          |
//! | dnis             | `dnis`, `toAddress`                       |
//! | state            | `state`, `status`                         |
//!
//! A value is "present" when it is neither null nor an empty string.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::flow_event::FlowMetadata;

/// States that count as waiting in queue (compared upper-cased).
pub const QUEUED_STATES: [&str; 2] = ["QUEUED", "IN_QUEUE"];

/// Channel type reported when the upstream omits one.
pub const DEFAULT_CHANNEL_TYPE: &str = "telephony";

/// A loosely-typed task object as returned by the upstream platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTask(Map<String, Value>);

impl RawTask {
    /// Wrap a JSON value; anything but an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// First present value among `keys`.
    fn first(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| is_present(value))
    }

    /// First present value among `keys`, rendered as text. Numbers and
    /// booleans are stringified; arrays and objects are ignored.
    fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(as_text)
    }

    pub fn id(&self) -> Option<String> {
        self.first_text(&["id", "taskId"])
    }

    pub fn interaction_id(&self) -> Option<String> {
        self.first_text(&["interactionId", "interactionIdRef"])
    }

    /// Identifier used for queue matching.
    pub fn queue_identifier(&self) -> Option<String> {
        self.first_text(&["queueId", "queueName", "queue"])
    }

    pub fn channel_type(&self) -> Option<String> {
        self.first_text(&["channelType", "channel"])
    }

    pub fn created_time(&self) -> Option<Value> {
        self.first(&["createdTime", "createdAt"]).cloned()
    }

    pub fn end_time(&self) -> Option<Value> {
        self.first(&["endTime", "endedAt"]).cloned()
    }

    pub fn ani(&self) -> Option<String> {
        self.first_text(&["ani", "fromAddress", "callerId"])
    }

    pub fn dnis(&self) -> Option<String> {
        self.first_text(&["dnis", "toAddress"])
    }

    /// State exactly as the upstream reported it.
    pub fn state(&self) -> Option<String> {
        self.first_text(&["state", "status"])
    }

    /// Upper-cased state, empty when absent.
    pub fn normalized_state(&self) -> String {
        self.state().unwrap_or_default().to_uppercase()
    }

    pub fn wait_time_seconds(&self) -> Option<Value> {
        self.first(&["waitTimeSeconds"])
            .filter(|value| value.is_number())
            .cloned()
    }

    /// True if the task is waiting in a queue.
    pub fn is_queued(&self) -> bool {
        let state = self.normalized_state();
        QUEUED_STATES.contains(&state.as_str())
    }

    /// Case-insensitive queue match against [`queue_identifier`](Self::queue_identifier).
    pub fn in_queue(&self, queue_id: &str) -> bool {
        self.queue_identifier()
            .is_some_and(|q| q.to_lowercase() == queue_id.to_lowercase())
    }

    /// Map to the widget shape, joining flow metadata.
    ///
    /// `fallback_queue` fills `queueId` when the task carries no `queueId`
    /// field; when that is also `None` the other queue aliases are used.
    /// `callerId` prefers the flow metadata, then the task's ani.
    pub fn normalize(&self, fallback_queue: Option<&str>, meta: &FlowMetadata) -> NormalizedTask {
        let ani = self.ani();
        NormalizedTask {
            id: self.id(),
            interaction_id: self.interaction_id().or_else(|| meta.interaction_id.clone()),
            queue_id: self
                .first_text(&["queueId"])
                .or_else(|| fallback_queue.map(str::to_string))
                .or_else(|| self.queue_identifier()),
            channel_type: self
                .channel_type()
                .unwrap_or_else(|| DEFAULT_CHANNEL_TYPE.to_string()),
            created_time: self.created_time(),
            caller_id: meta.caller_id.clone().or_else(|| ani.clone()),
            ani,
            dnis: self.dnis(),
            state: self.state(),
            wait_time_seconds: self.wait_time_seconds(),
        }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Extract the task list from an upstream payload.
///
/// Accepts `{"tasks": [...]}`, then `{"items": [...]}`, then a bare array;
/// anything else is an empty list. Non-object entries are dropped.
pub fn unwrap_task_envelope(payload: Value) -> Vec<RawTask> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match (map.remove("tasks"), map.remove("items")) {
            (Some(Value::Array(tasks)), _) => tasks,
            (_, Some(Value::Array(items))) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items.into_iter().filter_map(RawTask::from_value).collect()
}

/// Task shape served by the queue endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizedTask {
    pub id: Option<String>,
    pub interaction_id: Option<String>,
    pub queue_id: Option<String>,
    pub channel_type: String,
    pub created_time: Option<Value>,
    pub ani: Option<String>,
    pub dnis: Option<String>,
    pub state: Option<String>,
    pub caller_id: Option<String>,
    pub wait_time_seconds: Option<Value>,
}

/// Task shape served by the history endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTask {
    #[serde(flatten)]
    pub task: NormalizedTask,
    #[serde(default)]
    pub end_time: Option<Value>,
}

impl HistoryTask {
    pub fn from_raw(raw: &RawTask, meta: &FlowMetadata) -> Self {
        Self {
            task: raw.normalize(None, meta),
            end_time: raw.end_time(),
        }
    }
}
