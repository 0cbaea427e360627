//! Authenticated HTTP client for the upstream task API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::domain::errors::{CherryPickerError, CherryPickerResult, UpstreamStatus};
use crate::domain::models::UpstreamConfig;
use crate::domain::ports::{RequestOptions, UpstreamApi};
use crate::infrastructure::logging::scrub_secrets;
use crate::services::TokenCache;

/// HTTP client for the upstream task API.
///
/// Every call attaches a bearer token from the shared [`TokenCache`], is
/// bounded by the configured timeout, and is attempted exactly once.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    tokens: Arc<TokenCache>,
}

impl UpstreamClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<TokenCache>,
        timeout: Duration,
    ) -> CherryPickerResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| CherryPickerError::Upstream {
                status: UpstreamStatus::Unreachable,
                details: Value::from(format!("failed to build HTTP client: {e}")),
            })?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(config: &UpstreamConfig, tokens: Arc<TokenCache>) -> CherryPickerResult<Self> {
        Self::new(
            config.base_url.clone(),
            tokens,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn extra_headers(headers: &[(String, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!(header = %name, "skipping invalid upstream header"),
            }
        }
        map
    }
}

/// Error details as JSON when the body parses, else the raw text.
fn parse_details(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::from(body))
}

#[async_trait]
impl UpstreamApi for UpstreamClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> CherryPickerResult<Value> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, "application/json");
        if !options.params.is_empty() {
            req = req.query(&options.params);
        }
        if let Some(data) = &options.data {
            req = req.json(data);
        }
        if !options.headers.is_empty() {
            req = req.headers(Self::extra_headers(&options.headers));
        }

        debug!(%method, %url, "calling upstream");
        let resp = req.send().await.map_err(|e| {
            let status = if e.is_timeout() {
                UpstreamStatus::Timeout
            } else {
                UpstreamStatus::Unreachable
            };
            error!(%method, %url, %status, error = %e, "upstream API error");
            CherryPickerError::Upstream {
                status,
                details: Value::from(e.to_string()),
            }
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            let status = if e.is_timeout() {
                UpstreamStatus::Timeout
            } else {
                UpstreamStatus::Http(status.as_u16())
            };
            error!(%method, %url, %status, error = %e, "failed to read upstream body");
            CherryPickerError::Upstream {
                status,
                details: Value::from(e.to_string()),
            }
        })?;

        if !status.is_success() {
            error!(
                %method,
                %url,
                status = status.as_u16(),
                body = %scrub_secrets(&body),
                "upstream API error"
            );
            return Err(CherryPickerError::Upstream {
                status: UpstreamStatus::Http(status.as_u16()),
                details: parse_details(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            error!(
                %method,
                %url,
                status = status.as_u16(),
                body = %scrub_secrets(&body),
                error = %e,
                "upstream returned unparseable body"
            );
            CherryPickerError::MalformedResponse(e.to_string())
        })
    }
}
