//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Legacy and prefixed environment variable overrides
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, LOCAL_CONFIG_PATH, PROJECT_CONFIG_PATH};
