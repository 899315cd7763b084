//! Upstream HTTP access.
//!
//! [`Transport`] is the seam the client talks to: it takes fully-built
//! [`RequestParams`] and returns the raw XML body of a successful response.
//! [`HttpTransport`] is the production implementation, layering token
//! handling and retry over an [`HttpClient`].

pub mod http;
pub mod retry;

pub use http::{HttpClient, HttpRequest, NetworkError, RawResponse, ReqwestClient};
pub use retry::{HttpTransport, RetryPolicy, Sleeper, ThreadSleeper};

use crate::error::EntsoeError;
use crate::request::RequestParams;

/// Default upstream endpoint.
pub const DEFAULT_BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Sends one logical request upstream, retries included.
pub trait Transport {
    /// Returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Any [`EntsoeError`] raised by status classification or the network.
    fn send(&self, params: &RequestParams) -> Result<String, EntsoeError>;

    /// Endpoint requests are sent to.
    fn base_url(&self) -> &str {
        DEFAULT_BASE_URL
    }

    /// The token attached to requests, if a usable one is configured.
    fn token(&self) -> Option<&str> {
        None
    }
}

impl<F> Transport for F
where
    F: Fn(&RequestParams) -> Result<String, EntsoeError>,
{
    fn send(&self, params: &RequestParams) -> Result<String, EntsoeError> {
        self(params)
    }
}

/// Hides all but the first four characters of a token.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

/// Builds the full request URL for display, with the token masked.
pub fn preview_url(base_url: &str, token: Option<&str>, params: &RequestParams) -> String {
    let token = token.map_or_else(|| "<missing>".to_string(), mask_token);
    let mut url = format!("{base_url}?securityToken={token}");
    for (key, value) in params.to_query() {
        url.push('&');
        url.push_str(key);
        url.push('=');
        url.push_str(&value);
    }
    url
}
