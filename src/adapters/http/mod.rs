//! HTTP surface of the proxy (axum).

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{build_router, AppState, CherryPickerHttpServer};
pub use types::{ApiError, ErrorResponse};
