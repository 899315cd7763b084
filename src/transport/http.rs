//! Single-attempt HTTP GET, abstracted so retry logic can be tested offline.

use std::time::Duration;

use crate::error::EntsoeError;

/// Status code and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Everything needed to issue one GET.
#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub url: &'a str,
    pub query: Vec<(&'static str, String)>,
    pub bearer: &'a str,
}

/// Failure below the HTTP layer: DNS, connect, reset, timeout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NetworkError {
    pub message: String,
    pub timeout: bool,
}

impl NetworkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
        }
    }
}

/// Issues exactly one GET; never retries.
pub trait HttpClient {
    /// # Errors
    ///
    /// [`NetworkError`] when no HTTP response was received.
    fn get(&self, request: &HttpRequest<'_>) -> Result<RawResponse, NetworkError>;
}

/// Blocking `reqwest` client with a fixed timeout.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Builds the underlying client.
    ///
    /// Must be called outside of an async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`EntsoeError::Transport`] when the TLS backend fails to initialise.
    pub fn new(timeout: Duration) -> Result<Self, EntsoeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("entsoe-grid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EntsoeError::Transport {
                message: format!("failed to create HTTP client: {e}"),
                status: None,
            })?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, request: &HttpRequest<'_>) -> Result<RawResponse, NetworkError> {
        let response = self
            .client
            .get(request.url)
            .query(&request.query)
            .bearer_auth(request.bearer)
            .send()
            .map_err(|e| network_error(e, "request failed"))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| network_error(e, "failed to read body"))?;
        Ok(RawResponse { status, body })
    }
}

/// Drops the request URL from the error text; the query carries the token.
fn network_error(err: reqwest::Error, context: &str) -> NetworkError {
    NetworkError {
        timeout: err.is_timeout(),
        message: format!("{context}: {}", err.without_url()),
    }
}
