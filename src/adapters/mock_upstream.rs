//! Scripted upstream for testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::errors::{CherryPickerError, CherryPickerResult, UpstreamStatus};
use crate::domain::ports::{RequestOptions, UpstreamApi};

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub options: RequestOptions,
}

/// Canned outcome for one call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Ok(Value),
    Status { status: u16, details: Value },
    Timeout,
    Malformed(String),
}

impl MockReply {
    fn into_result(self) -> CherryPickerResult<Value> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Status { status, details } => Err(CherryPickerError::Upstream {
                status: UpstreamStatus::Http(status),
                details,
            }),
            Self::Timeout => Err(CherryPickerError::Upstream {
                status: UpstreamStatus::Timeout,
                details: Value::from("request timed out"),
            }),
            Self::Malformed(body) => Err(CherryPickerError::MalformedResponse(body)),
        }
    }
}

/// Upstream that replays queued replies and records every call.
///
/// When the queue is empty each call answers with the fallback reply
/// (`{"tasks": []}` unless overridden).
#[derive(Debug)]
pub struct MockUpstream {
    replies: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUpstream {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: MockReply::Ok(serde_json::json!({ "tasks": [] })),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock that always answers with `reply`.
    pub fn always(reply: MockReply) -> Self {
        Self {
            fallback: reply,
            ..Self::new()
        }
    }

    /// Mock that answers every call with `value`.
    pub fn returning(value: Value) -> Self {
        Self::always(MockReply::Ok(value))
    }

    /// Queue a reply for the next unanswered call.
    pub async fn push(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Calls received so far.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl UpstreamApi for MockUpstream {
    async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> CherryPickerResult<Value> {
        self.calls.lock().await.push(RecordedCall {
            method,
            path: path.to_string(),
            options,
        });
        let reply = self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.into_result()
    }
}
