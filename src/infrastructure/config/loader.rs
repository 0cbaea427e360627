use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{Config, UpstreamConfig};
use crate::services::MAX_HISTORY_HOURS;

/// Project configuration, created by the operator
pub const PROJECT_CONFIG_PATH: &str = ".cherry-picker/config.yaml";

/// Untracked local overrides
pub const LOCAL_CONFIG_PATH: &str = ".cherry-picker/local.yaml";

/// Upstream settings that older deployments pass as `WXCC_<FIELD>`.
const LEGACY_UPSTREAM_KEYS: &[&str] = &["base_url", "token_url", "client_id", "client_secret", "org_id"];

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting upstream.{0}")]
    MissingUpstreamField(&'static str),

    #[error("Invalid URL for {field}: {value}. Must start with http:// or https://")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Invalid port: 0")]
    InvalidPort,

    #[error("Invalid upstream.timeout_secs: 0. Must be at least 1")]
    InvalidTimeout,

    #[error("Invalid upstream.assign_path: {0}. Must contain {{taskId}}")]
    InvalidAssignPath(String),

    #[error("Invalid upstream.queue_window_minutes: {0}. Must be positive")]
    InvalidQueueWindow(i64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid widget.poll_interval_secs: 0. Must be at least 1")]
    InvalidPollInterval,

    #[error("Invalid widget.history_hours: {0}. Must be between 1 and {max}", max = MAX_HISTORY_HOURS)]
    InvalidHistoryHours(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Provider stack shared by every entry point.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. Each file in `files`, in order
    /// 3. Legacy `WXCC_*` upstream variables and `PORT`
    /// 4. `CHERRY_PICKER_*` variables, nested on `__`
    pub fn figment(files: &[&Path]) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        for file in files {
            figment = figment.merge(Yaml::file(file));
        }
        figment
            .merge(
                Env::prefixed("WXCC_")
                    .only(LEGACY_UPSTREAM_KEYS)
                    .map(|key| format!("upstream.{key}").into()),
            )
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .merge(Env::prefixed("CHERRY_PICKER_").split("__"))
    }

    /// Load configuration from the project directory (pwd/.cherry-picker/).
    ///
    /// Only the settings every command needs are validated here; the proxy
    /// additionally calls [`ConfigLoader::validate`] before serving.
    pub fn load() -> Result<Config> {
        Self::extract(Self::figment(&[
            Path::new(PROJECT_CONFIG_PATH),
            Path::new(LOCAL_CONFIG_PATH),
        ]))
    }

    /// Load configuration from a specific file instead of the project files
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Self::extract(Self::figment(&[path]))
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .context("Failed to extract configuration from figment")?;
        Self::validate_common(&config)?;
        Ok(config)
    }

    /// Full validation, including the upstream credentials the proxy needs.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_common(config)?;
        Self::validate_upstream(&config.upstream)
    }

    /// Settings shared by the proxy and the widget commands.
    pub fn validate_common(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.widget.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        let hours = config.widget.history_hours;
        if hours == 0 || hours > MAX_HISTORY_HOURS {
            return Err(ConfigError::InvalidHistoryHours(hours));
        }

        check_url("widget.api_base", &config.widget.api_base)
    }

    fn validate_upstream(upstream: &UpstreamConfig) -> Result<(), ConfigError> {
        let required = [
            ("base_url", &upstream.base_url),
            ("token_url", &upstream.token_url),
            ("client_id", &upstream.client_id),
            ("client_secret", &upstream.client_secret),
            ("org_id", &upstream.org_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingUpstreamField(name));
            }
        }

        check_url("upstream.base_url", &upstream.base_url)?;
        check_url("upstream.token_url", &upstream.token_url)?;

        if upstream.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        if !upstream.assign_path.contains("{taskId}") {
            return Err(ConfigError::InvalidAssignPath(upstream.assign_path.clone()));
        }

        if upstream.queue_window_minutes <= 0 {
            return Err(ConfigError::InvalidQueueWindow(upstream.queue_window_minutes));
        }

        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn complete_upstream() -> UpstreamConfig {
        UpstreamConfig {
            base_url: "https://api.example.com/v1".to_string(),
            token_url: "https://idbroker.example.com/oauth2/v1/access_token".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            org_id: "org-1".to_string(),
            ..Default::default()
        }
    }

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.upstream.timeout_secs, 10);
        assert_eq!(config.widget.poll_interval_secs, 10);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate_common(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_default_config_lacks_upstream_credentials() {
        let result = ConfigLoader::validate(&Config::default());
        assert_eq!(result, Err(ConfigError::MissingUpstreamField("base_url")));
    }

    #[test]
    fn test_validate_complete_config() {
        let config = Config {
            upstream: complete_upstream(),
            ..Default::default()
        };
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_missing_org_id() {
        let mut config = Config {
            upstream: complete_upstream(),
            ..Default::default()
        };
        config.upstream.org_id = "  ".to_string();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::MissingUpstreamField("org_id"))
        );
    }

    #[test]
    fn test_validate_bad_url_scheme() {
        let mut config = Config {
            upstream: complete_upstream(),
            ..Default::default()
        };
        config.upstream.token_url = "ftp://tokens".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidUrl { field: "upstream.token_url", .. })
        ));
    }

    #[test]
    fn test_validate_zero_timeout_and_bad_assign_path() {
        let mut config = Config {
            upstream: complete_upstream(),
            ..Default::default()
        };
        config.upstream.timeout_secs = 0;
        assert_eq!(ConfigLoader::validate(&config), Err(ConfigError::InvalidTimeout));

        config.upstream.timeout_secs = 5;
        config.upstream.assign_path = "/tasks/assign".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidAssignPath(_))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        match ConfigLoader::validate_common(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert_eq!(
            ConfigLoader::validate_common(&config),
            Err(ConfigError::InvalidLogFormat("xml".to_string()))
        );
    }

    #[test]
    fn test_validate_widget_settings() {
        let mut config = Config::default();
        config.widget.poll_interval_secs = 0;
        assert_eq!(
            ConfigLoader::validate_common(&config),
            Err(ConfigError::InvalidPollInterval)
        );

        config.widget.poll_interval_secs = 10;
        config.widget.history_hours = 169;
        assert_eq!(
            ConfigLoader::validate_common(&config),
            Err(ConfigError::InvalidHistoryHours(169))
        );
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert_eq!(ConfigLoader::validate_common(&config), Err(ConfigError::InvalidPort));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
server:
  port: 8080
upstream:
  base_url: https://api.example.com
  time_format: iso8601
  history_states: [completed]
logging:
  level: debug
  format: pretty
widget:
  queue_id: Sales
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.base_url, "https://api.example.com");
        assert_eq!(
            config.upstream.time_format,
            crate::domain::models::TimeFormat::Iso8601
        );
        assert_eq!(config.upstream.history_states, vec!["completed"]);
        assert_eq!(config.upstream.tasks_path, "/tasks");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.widget.queue_id.as_deref(), Some("Sales"));
    }

    #[test]
    fn test_hierarchical_merging() {
        let base = yaml_file("server:\n  port: 4000\nlogging:\n  level: info\n  format: json\n");
        let overrides = yaml_file("logging:\n  level: debug\n");

        temp_env::with_vars_unset(["PORT", "CHERRY_PICKER_LOGGING__LEVEL"], || {
            let config: Config = ConfigLoader::figment(&[base.path(), overrides.path()])
                .extract()
                .unwrap();

            assert_eq!(config.logging.level, "debug", "Override should win");
            assert_eq!(config.logging.format, "json", "Base value should persist");
            assert_eq!(config.server.port, 4000);
        });
    }

    #[test]
    fn test_env_overrides_file() {
        let base = yaml_file("logging:\n  level: info\nupstream:\n  org_id: from-file\n");

        temp_env::with_vars(
            [
                ("CHERRY_PICKER_LOGGING__LEVEL", Some("warn")),
                ("CHERRY_PICKER_UPSTREAM__ORG_ID", Some("from-env")),
                ("CHERRY_PICKER_WIDGET__POLL_INTERVAL_SECS", Some("3")),
            ],
            || {
                let config: Config = ConfigLoader::figment(&[base.path()]).extract().unwrap();
                assert_eq!(config.logging.level, "warn");
                assert_eq!(config.upstream.org_id, "from-env");
                assert_eq!(config.widget.poll_interval_secs, 3);
            },
        );
    }

    #[test]
    fn test_legacy_environment_names() {
        temp_env::with_vars(
            [
                ("WXCC_BASE_URL", Some("https://legacy.example.com")),
                ("WXCC_ORG_ID", Some("legacy-org")),
                ("WXCC_CLIENT_SECRET", Some("legacy-secret")),
                ("PORT", Some("8181")),
                ("CHERRY_PICKER_UPSTREAM__ORG_ID", None),
            ],
            || {
                let config: Config = ConfigLoader::figment(&[]).extract().unwrap();
                assert_eq!(config.upstream.base_url, "https://legacy.example.com");
                assert_eq!(config.upstream.org_id, "legacy-org");
                assert_eq!(config.upstream.client_secret, "legacy-secret");
                assert_eq!(config.server.port, 8181);
            },
        );
    }

    #[test]
    fn test_prefixed_env_beats_legacy_env() {
        temp_env::with_vars(
            [
                ("WXCC_ORG_ID", Some("legacy-org")),
                ("CHERRY_PICKER_UPSTREAM__ORG_ID", Some("new-org")),
            ],
            || {
                let config: Config = ConfigLoader::figment(&[]).extract().unwrap();
                assert_eq!(config.upstream.org_id, "new-org");
            },
        );
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        assert!(ConfigLoader::load_from_file("/nonexistent/cherry-picker.yaml").is_err());
    }

    #[test]
    fn test_load_from_file_validates_common_settings() {
        let file = yaml_file("logging:\n  format: xml\n");
        temp_env::with_vars_unset(["CHERRY_PICKER_LOGGING__FORMAT"], || {
            let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
            assert!(format!("{err:#}").contains("Invalid log format"));
        });
    }
}
