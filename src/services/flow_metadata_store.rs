//! In-memory store of call-flow metadata keyed by upstream task id.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::errors::{CherryPickerError, CherryPickerResult};
use crate::domain::models::{FlowEventInput, FlowMetadata};

/// Process-lifetime map from task id to [`FlowMetadata`].
///
/// Last write wins and nothing is ever evicted; growth is bounded only by
/// the number of distinct task ids the flow hook reports.
#[derive(Debug, Default)]
pub struct FlowMetadataStore {
    entries: RwLock<HashMap<String, FlowMetadata>>,
}

impl FlowMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert metadata for `task_id`, stamping `received_at` with now.
    pub async fn record(
        &self,
        task_id: Option<&str>,
        input: FlowEventInput,
    ) -> CherryPickerResult<FlowMetadata> {
        let task_id = task_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CherryPickerError::validation("taskId is required"))?;

        let entry = FlowMetadata::from_input(input, Utc::now());
        let replaced = self
            .entries
            .write()
            .await
            .insert(task_id.to_string(), entry.clone())
            .is_some();

        debug!(task_id, replaced, "recorded flow metadata");
        Ok(entry)
    }

    /// Stored metadata, or an empty record for an unknown id.
    pub async fn lookup(&self, task_id: &str) -> FlowMetadata {
        self.entries
            .read()
            .await
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(caller: &str) -> FlowEventInput {
        FlowEventInput {
            caller_id: Some(caller.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_record_requires_task_id() {
        let store = FlowMetadataStore::new();
        let err = store.record(None, input("+1")).await.unwrap_err();
        assert!(err.is_validation());
        let err = store.record(Some("   "), input("+1")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_lookup_unknown_returns_empty_record() {
        let store = FlowMetadataStore::new();
        let meta = store.lookup("missing").await;
        assert!(meta.is_empty());
        assert_eq!(meta, FlowMetadata::default());
    }

    #[tokio::test]
    async fn test_record_then_lookup() {
        let store = FlowMetadataStore::new();
        store.record(Some("T1"), input("+15550001111")).await.unwrap();

        let meta = store.lookup("T1").await;
        assert_eq!(meta.caller_id.as_deref(), Some("+15550001111"));
        assert!(meta.received_at.is_some());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = FlowMetadataStore::new();
        store.record(Some("T1"), input("+1")).await.unwrap();
        store.record(Some("T1"), input("+2")).await.unwrap();

        assert_eq!(store.lookup("T1").await.caller_id.as_deref(), Some("+2"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() {
        let store = FlowMetadataStore::new();
        store.record(Some("Task-1"), input("+1")).await.unwrap();
        assert!(store.lookup("task-1").await.is_empty());
    }
}
