pub mod config;
pub mod flow_event;
pub mod task;
pub mod token;

pub use config::{Config, LoggingConfig, ServerConfig, TimeFormat, UpstreamConfig, WidgetConfig};
pub use flow_event::{FlowEventInput, FlowMetadata};
pub use task::{unwrap_task_envelope, HistoryTask, NormalizedTask, RawTask, QUEUED_STATES};
pub use token::{AccessToken, MAX_EXPIRES_IN_SECS};
