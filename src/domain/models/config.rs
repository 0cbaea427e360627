use serde::{Deserialize, Serialize};

/// Main configuration structure for Cherry Picker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream contact-center platform configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Terminal widget configuration
    #[serde(default)]
    pub widget: WidgetConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to answer CORS preflights for the widget origin
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_true(),
        }
    }
}

/// Timestamp encoding the upstream task query expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// Milliseconds since the Unix epoch
    EpochMillis,
    /// RFC 3339 / ISO-8601 with millisecond precision
    Iso8601,
}

/// Upstream platform configuration.
///
/// Credentials and the org id have no usable default; validation rejects
/// an empty value. The remaining fields describe the query contract, which
/// differs between API revisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpstreamConfig {
    /// Base URL of the task API, without trailing slash
    #[serde(default)]
    pub base_url: String,

    /// OAuth token endpoint
    #[serde(default)]
    pub token_url: String,

    /// OAuth client id
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,

    /// Organization id sent with every query and claim
    #[serde(default)]
    pub org_id: String,

    /// Timeout applied to every upstream call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// A cached token is refreshed this many seconds before it expires
    #[serde(default = "default_token_refresh_margin_secs")]
    pub token_refresh_margin_secs: u64,

    /// Path of the task query endpoint
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,

    /// Path template of the assign endpoint; `{taskId}` is substituted
    #[serde(default = "default_assign_path")]
    pub assign_path: String,

    /// Query parameter carrying the channel type filter
    #[serde(default = "default_channel_type_param")]
    pub channel_type_param: String,

    /// Channel type requested from the task query
    #[serde(default = "default_channel_type")]
    pub channel_type: String,

    /// Query parameter carrying the window start
    #[serde(default = "default_from_param")]
    pub from_param: String,

    /// Query parameter carrying the window end
    #[serde(default = "default_to_param")]
    pub to_param: String,

    /// Encoding of the window bounds
    #[serde(default = "default_time_format")]
    pub time_format: TimeFormat,

    /// Query parameter carrying the state filter for history queries
    #[serde(default = "default_state_param")]
    pub state_param: String,

    /// Query parameter carrying an optional queue scope for history queries
    #[serde(default = "default_queue_param")]
    pub queue_param: String,

    /// Terminal states requested for history
    #[serde(default = "default_history_states")]
    pub history_states: Vec<String>,

    /// Trailing window of the live queue view, in minutes
    #[serde(default = "default_queue_window_minutes")]
    pub queue_window_minutes: i64,
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_token_refresh_margin_secs() -> u64 {
    60
}

fn default_tasks_path() -> String {
    "/tasks".to_string()
}

fn default_assign_path() -> String {
    "/tasks/{taskId}/assign".to_string()
}

fn default_channel_type_param() -> String {
    "channelTypes".to_string()
}

fn default_channel_type() -> String {
    "telephony".to_string()
}

fn default_from_param() -> String {
    "from".to_string()
}

fn default_to_param() -> String {
    "to".to_string()
}

const fn default_time_format() -> TimeFormat {
    TimeFormat::EpochMillis
}

fn default_state_param() -> String {
    "states".to_string()
}

fn default_queue_param() -> String {
    "queueId".to_string()
}

fn default_history_states() -> Vec<String> {
    vec![
        "completed".to_string(),
        "abandoned".to_string(),
        "terminated".to_string(),
    ]
}

const fn default_queue_window_minutes() -> i64 {
    15
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            org_id: String::new(),
            timeout_secs: default_timeout_secs(),
            token_refresh_margin_secs: default_token_refresh_margin_secs(),
            tasks_path: default_tasks_path(),
            assign_path: default_assign_path(),
            channel_type_param: default_channel_type_param(),
            channel_type: default_channel_type(),
            from_param: default_from_param(),
            to_param: default_to_param(),
            time_format: default_time_format(),
            state_param: default_state_param(),
            queue_param: default_queue_param(),
            history_states: default_history_states(),
            queue_window_minutes: default_queue_window_minutes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Terminal widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WidgetConfig {
    /// Base URL of the proxy's API surface
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Seconds between refreshes
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Trailing window shown in the history table
    #[serde(default = "default_history_hours")]
    pub history_hours: u32,

    /// Queue watched by default
    #[serde(default)]
    pub queue_id: Option<String>,

    /// Agent that claims tasks
    #[serde(default)]
    pub agent_id: Option<String>,

    /// Device the claimed call is delivered to
    #[serde(default)]
    pub device_id: Option<String>,
}

fn default_api_base() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

const fn default_poll_interval_secs() -> u64 {
    10
}

const fn default_history_hours() -> u32 {
    24
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            poll_interval_secs: default_poll_interval_secs(),
            history_hours: default_history_hours(),
            queue_id: None,
            agent_id: None,
            device_id: None,
        }
    }
}
