//! OAuth client-credentials exchange against the upstream identity provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::domain::errors::{CherryPickerError, CherryPickerResult};
use crate::domain::models::{AccessToken, UpstreamConfig, MAX_EXPIRES_IN_SECS};
use crate::domain::ports::TokenProvider;
use crate::infrastructure::logging::scrub_secrets;

/// Fields read from the token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<Value>,
}

/// Whole seconds from an `expires_in` value: an integer, a float without a
/// fractional part, or a string holding either.
fn expires_in_secs(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_secs)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_secs))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_secs(secs: f64) -> Option<i64> {
    (secs.is_finite() && secs.fract() == 0.0 && secs.abs() <= MAX_EXPIRES_IN_SECS as f64)
        .then_some(secs as i64)
}

/// Performs one `grant_type=client_credentials` exchange per call.
#[derive(Clone)]
pub struct ClientCredentialsProvider {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsProvider {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> CherryPickerResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CherryPickerError::Auth(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> CherryPickerResult<Self> {
        Self::new(
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl std::fmt::Debug for ClientCredentialsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsProvider")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn fetch_token(&self) -> CherryPickerResult<AccessToken> {
        let issued_at = Utc::now();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        debug!(token_url = %self.token_url, "requesting client-credentials token");
        let resp = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(token_url = %self.token_url, error = %e, "token request failed");
                CherryPickerError::Auth(format!("token request failed: {e}"))
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CherryPickerError::Auth(format!("failed to read token response: {e}")))?;

        if !status.is_success() {
            let body = scrub_secrets(&body);
            error!(token_url = %self.token_url, status = status.as_u16(), body = %body, "token endpoint rejected credentials");
            return Err(CherryPickerError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| CherryPickerError::Auth(format!("malformed token response: {e}")))?;

        let access_token = parsed.access_token.filter(|v| !v.is_empty());
        let expires_in = parsed.expires_in.filter(|v| !v.is_null());
        let (Some(value), Some(expires_in)) = (access_token, expires_in) else {
            return Err(CherryPickerError::Auth(
                "token response is missing access_token or expires_in".to_string(),
            ));
        };

        expires_in_secs(&expires_in)
            .and_then(|secs| AccessToken::from_expires_in(value, secs, issued_at))
            .ok_or_else(|| {
                error!(token_url = %self.token_url, %expires_in, "token response has invalid expires_in");
                CherryPickerError::Auth("token response has invalid expires_in".to_string())
            })
    }
}
