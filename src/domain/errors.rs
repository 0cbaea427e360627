//! Domain errors for the Cherry Picker proxy.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Status reported for a failed upstream call.
///
/// Serializes as the numeric HTTP code, or as the strings `"timeout"` /
/// `"unreachable"` when no response was received at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStatus {
    /// The upstream answered with a non-2xx HTTP status.
    Http(u16),
    /// The call exceeded the configured timeout.
    Timeout,
    /// The upstream could not be reached (DNS, connect, TLS, reset).
    Unreachable,
}

impl UpstreamStatus {
    /// Numeric code if the upstream actually answered.
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::Http(code) => Some(*code),
            Self::Timeout | Self::Unreachable => None,
        }
    }

    /// JSON representation used in error bodies.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Http(code) => Value::from(*code),
            Self::Timeout => Value::from("timeout"),
            Self::Unreachable => Value::from("unreachable"),
        }
    }
}

impl fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "{code}"),
            Self::Timeout => f.write_str("timeout"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

impl Serialize for UpstreamStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Http(code) => serializer.serialize_u16(*code),
            Self::Timeout => serializer.serialize_str("timeout"),
            Self::Unreachable => serializer.serialize_str("unreachable"),
        }
    }
}

/// Errors raised by the proxy and its services.
#[derive(Debug, Error)]
pub enum CherryPickerError {
    /// Required input was missing or out of range.
    #[error("{0}")]
    Validation(String),

    /// The client-credentials exchange failed or returned an unusable payload.
    #[error("Authentication with upstream failed: {0}")]
    Auth(String),

    /// The upstream answered non-2xx, timed out, or was unreachable.
    #[error("Upstream request failed with status {status}")]
    Upstream {
        status: UpstreamStatus,
        details: Value,
    },

    /// The upstream answered 2xx with a body that is not valid JSON.
    #[error("Upstream returned a malformed response: {0}")]
    MalformedResponse(String),
}

impl CherryPickerError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns true for caller mistakes (surfaced as 400).
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type CherryPickerResult<T> = Result<T, CherryPickerError>;

impl From<serde_json::Error> for CherryPickerError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
