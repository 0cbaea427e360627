use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::domain::errors::CherryPickerResult;

/// Optional parts of an upstream request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query string parameters, in order
    pub params: Vec<(String, String)>,
    /// JSON body
    pub data: Option<Value>,
    /// Extra headers; applied after the defaults so they can override them
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set the JSON body.
    pub fn json(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Authenticated access to the upstream task API.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Issue one request against `<base_url><path>` and return the parsed body.
    ///
    /// A 2xx with an empty body yields `Value::Null`. Non-2xx responses,
    /// timeouts and transport failures yield
    /// [`CherryPickerError::Upstream`](crate::domain::CherryPickerError::Upstream);
    /// nothing is retried.
    async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> CherryPickerResult<Value>;
}
