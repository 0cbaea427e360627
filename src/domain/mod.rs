//! Domain layer for the Cherry Picker proxy
//!
//! Core data shapes, the error taxonomy, and the port traits that
//! infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CherryPickerError, CherryPickerResult, UpstreamStatus};
