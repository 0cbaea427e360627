//! Adapters for external systems.
//!
//! - `http`: the proxy's axum routes
//! - `backend_client`: reqwest client the widget uses against those routes
//! - `mock_upstream`: in-memory upstream for service and router tests

pub mod backend_client;
pub mod http;
pub mod mock_upstream;

pub use backend_client::{BackendClient, BackendError};
