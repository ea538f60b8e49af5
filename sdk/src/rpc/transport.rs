//! The one seam between the SDK and an RPC node.
//!
//! [`RpcTransport`] is a single async method call: name plus JSON params in,
//! the `result` value out. [`HttpTransport`] implements it as JSON-RPC 2.0
//! over HTTP POST. Tests and embedders can put anything else behind the
//! trait.
//!
//! Failures are classified once, here:
//!
//! - connection errors, timeouts, HTTP 429 and 5xx → [`Error::TransientNetwork`]
//! - a JSON-RPC `error` object → [`Error::RpcProtocol`]
//! - a body that is not a JSON-RPC response → [`Error::ResponseDecode`]

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::RpcConfig;
use crate::error::{Error, Result, ValidationError};

use super::types::{RpcRequest, RpcResponse};

/// A JSON-RPC method-call surface.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Calls `method` and returns its `result` value.
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

/// JSON-RPC over HTTP POST to a single endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Transport with the default timeout and no extra headers.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::from_config(&RpcConfig::new(url))
    }

    pub fn from_config(config: &RpcConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ValidationError::InvalidField(format!("header name {name:?}: {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ValidationError::InvalidField(format!("header value for {name}: {e}"))
            })?;
            headers.insert(name, value);
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ValidationError::InvalidField(format!("http client: {e}")))?;
        Ok(Self::with_client(config.url.clone(), client))
    }

    /// Wraps an existing client, keeping its settings.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = RpcRequest::new(method, params);
        tracing::trace!(method, id = %request.id, url = %self.url, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if is_transient_status(status) {
            return Err(Error::TransientNetwork(format!("{method}: HTTP {status}")));
        }

        let body = response.bytes().await.map_err(classify_reqwest_error)?;
        let parsed: RpcResponse = serde_json::from_slice(&body).map_err(|e| {
            Error::ResponseDecode(format!("{method}: HTTP {status}, body is not JSON-RPC: {e}"))
        })?;
        parsed.into_result()
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn classify_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_decode() {
        Error::ResponseDecode(err.to_string())
    } else {
        Error::TransientNetwork(err.to_string())
    }
}
