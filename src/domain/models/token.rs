//! Bearer token issued by the upstream OAuth endpoint.

use chrono::{DateTime, Duration, Utc};

/// Longest lifetime accepted from the token endpoint (one year).
pub const MAX_EXPIRES_IN_SECS: i64 = 365 * 24 * 60 * 60;

/// A bearer token and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Build a token from an OAuth `expires_in` (seconds) relative to `issued_at`.
    ///
    /// Returns `None` unless `expires_in_secs` is in `1..=MAX_EXPIRES_IN_SECS`
    /// and the resulting instant is representable.
    pub fn from_expires_in(
        value: String,
        expires_in_secs: i64,
        issued_at: DateTime<Utc>,
    ) -> Option<Self> {
        if !(1..=MAX_EXPIRES_IN_SECS).contains(&expires_in_secs) {
            return None;
        }
        let expires_at = issued_at.checked_add_signed(Duration::try_seconds(expires_in_secs)?)?;
        Some(Self { value, expires_at })
    }

    /// True if the token can still be handed out at `now`, keeping `margin`
    /// in reserve for clock skew and in-flight latency.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now < self.expires_at - margin
    }
}

// Never print the token itself.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
