//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - Optional rolling log files
//! - Secret scrubbing for logged upstream bodies

pub mod logger;
pub mod secret_scrubbing;

pub use logger::{LogFormat, LoggerImpl, RotationPolicy};
pub use secret_scrubbing::scrub_secrets;
