//! Infrastructure layer module
//!
//! Adapters to the outside world that satisfy the domain ports:
//! - Upstream OAuth exchange and task API client
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod upstream;
