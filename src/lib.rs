//! Cherry Picker - contact-center queue proxy
//!
//! Cherry Picker sits between an agent-facing widget and a contact-center
//! platform's task API. It holds the OAuth client credentials, caches the
//! access token, enriches tasks with caller metadata posted by call flows,
//! and exposes a small JSON API for listing and claiming queued tasks.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Task shapes, configuration, errors, ports
//! - **Service Layer** (`services`): Token cache, flow metadata, task queries and claims
//! - **Adapters** (`adapters`): axum routes and the widget's HTTP client
//! - **Application Layer** (`application`): The widget's refresh loop
//! - **Infrastructure Layer** (`infrastructure`): Config, logging, upstream HTTP
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use cherry_picker::cli::commands::serve::build_state;
//! use cherry_picker::adapters::http::CherryPickerHttpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = cherry_picker::ConfigLoader::load()?;
//!     cherry_picker::ConfigLoader::validate(&config)?;
//!     let state = build_state(&config.upstream)?;
//!     CherryPickerHttpServer::new(state, config.server).serve().await
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::http::{build_router, AppState, CherryPickerHttpServer};
pub use application::{PollerConfig, PollerEvent, QueuePoller};
pub use domain::models::{
    Config, FlowEventInput, FlowMetadata, HistoryTask, LoggingConfig, NormalizedTask,
    ServerConfig, UpstreamConfig, WidgetConfig,
};
pub use domain::ports::{TaskFeed, TokenProvider, UpstreamApi};
pub use domain::{CherryPickerError, CherryPickerResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    AssignmentService, FlowMetadataStore, TaskHistoryService, TaskQueryService, TokenCache,
};
