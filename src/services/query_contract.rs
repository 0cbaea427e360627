//! Upstream query contract: parameter names, time encoding, and paths.
//!
//! Different revisions of the task API disagree on names (`channelTypes`
//! vs `channelType`, `from`/`to` vs `fromDateTime`/`toDateTime`) and on the
//! timestamp encoding. Everything that varies lives here, driven by
//! [`UpstreamConfig`].

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::domain::models::{TimeFormat, UpstreamConfig};
use crate::domain::ports::RequestOptions;

/// Placeholder substituted in the assign path template.
pub const TASK_ID_PLACEHOLDER: &str = "{taskId}";

#[derive(Debug, Clone)]
pub struct QueryContract {
    pub org_id: String,
    pub tasks_path: String,
    pub assign_path: String,
    pub channel_type_param: String,
    pub channel_type: String,
    pub from_param: String,
    pub to_param: String,
    pub time_format: TimeFormat,
    pub state_param: String,
    pub queue_param: String,
    pub history_states: Vec<String>,
    pub queue_window: Duration,
}

impl QueryContract {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            org_id: config.org_id.clone(),
            tasks_path: config.tasks_path.clone(),
            assign_path: config.assign_path.clone(),
            channel_type_param: config.channel_type_param.clone(),
            channel_type: config.channel_type.clone(),
            from_param: config.from_param.clone(),
            to_param: config.to_param.clone(),
            time_format: config.time_format,
            state_param: config.state_param.clone(),
            queue_param: config.queue_param.clone(),
            history_states: config.history_states.clone(),
            queue_window: Duration::minutes(config.queue_window_minutes),
        }
    }

    /// Encode a timestamp the way the upstream expects.
    pub fn format_time(&self, at: DateTime<Utc>) -> String {
        match self.time_format {
            TimeFormat::EpochMillis => at.timestamp_millis().to_string(),
            TimeFormat::Iso8601 => at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Base parameters for a task query over `[from, to]`.
    pub fn window_options(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> RequestOptions {
        RequestOptions::new()
            .param("orgId", self.org_id.clone())
            .param(self.channel_type_param.clone(), self.channel_type.clone())
            .param(self.from_param.clone(), self.format_time(from))
            .param(self.to_param.clone(), self.format_time(to))
    }

    /// Parameters for the live queue view ending at `now`.
    pub fn queue_options(&self, now: DateTime<Utc>) -> RequestOptions {
        self.window_options(now - self.queue_window, now)
    }

    /// Parameters for a history query over the trailing `hours`.
    pub fn history_options(
        &self,
        now: DateTime<Utc>,
        hours: u32,
        queue_id: Option<&str>,
    ) -> RequestOptions {
        let mut options = self.window_options(now - Duration::hours(i64::from(hours)), now);
        if !self.history_states.is_empty() {
            options = options.param(self.state_param.clone(), self.history_states.join(","));
        }
        if let Some(queue_id) = queue_id {
            options = options.param(self.queue_param.clone(), queue_id);
        }
        options
    }

    /// Assign endpoint path for `task_id`, percent-encoded.
    pub fn assign_path_for(&self, task_id: &str) -> String {
        self.assign_path
            .replace(TASK_ID_PLACEHOLDER, &encode_path_segment(task_id))
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub(crate) fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}
