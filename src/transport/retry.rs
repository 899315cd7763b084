//! Status classification and retry over an [`HttpClient`].

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use super::http::{HttpClient, HttpRequest, RawResponse, ReqwestClient};
use super::{Transport, DEFAULT_BASE_URL, mask_token};
use crate::error::EntsoeError;
use crate::parser::acknowledgement_reason;
use crate::request::RequestParams;

/// Retry budget and backoff shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Waits allowed after HTTP 429 before giving up.
    pub max_rate_limit_retries: u32,
    /// Waits allowed after HTTP 5xx before giving up.
    pub max_server_retries: u32,
    /// Re-sends allowed after a network failure.
    pub network_retries: u32,
    /// Upper bound of random extra delay, as a fraction of the backoff.
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            max_rate_limit_retries: 3,
            max_server_retries: 2,
            network_retries: 1,
            jitter_ratio: 0.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never waits or retries.
    pub fn none() -> Self {
        Self {
            max_rate_limit_retries: 0,
            max_server_retries: 0,
            network_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (zero-based): `base · 2^attempt`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if self.jitter_ratio > 0.0 {
            let extra = rand::rng().random_range(0.0..=self.jitter_ratio);
            delay.mul_f64(1.0 + extra).min(self.max_delay)
        } else {
            delay
        }
    }
}

/// Blocks the calling thread between retries.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps with [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Token-authenticated transport with rate-limit and transient-error retry.
#[derive(Debug, Clone)]
pub struct HttpTransport<C = ReqwestClient, S = ThreadSleeper> {
    client: C,
    sleeper: S,
    policy: RetryPolicy,
    base_url: String,
    token: Option<String>,
}

impl<C, S> HttpTransport<C, S> {
    /// # Arguments
    ///
    /// * `client` - Issues single GET attempts
    /// * `sleeper` - Performs backoff waits
    /// * `policy` - Retry budget
    /// * `base_url` - Upstream endpoint
    /// * `token` - Security token; `None` or blank fails every request
    pub fn new(
        client: C,
        sleeper: S,
        policy: RetryPolicy,
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            sleeper,
            policy,
            base_url: base_url.into(),
            token,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl HttpTransport {
    /// Production transport against the default endpoint.
    ///
    /// # Errors
    ///
    /// Propagates [`ReqwestClient::new`] failures.
    pub fn with_token(token: Option<String>, timeout: Duration) -> Result<Self, EntsoeError> {
        Ok(Self::new(
            ReqwestClient::new(timeout)?,
            ThreadSleeper,
            RetryPolicy::default(),
            DEFAULT_BASE_URL,
            token,
        ))
    }
}

impl<C: HttpClient, S: Sleeper> Transport for HttpTransport<C, S> {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured token, ignoring blank values.
    fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    fn send(&self, params: &RequestParams) -> Result<String, EntsoeError> {
        let token = self.token().ok_or_else(|| EntsoeError::Authentication {
            message: "no API token configured".to_string(),
            status: None,
        })?;

        let mut query = vec![("securityToken", token.to_string())];
        query.extend(params.to_query());
        debug!(
            url = %self.base_url,
            token = %mask_token(token),
            document_type = params.document_type.code(),
            "sending upstream request"
        );
        let request = HttpRequest {
            url: &self.base_url,
            query,
            bearer: token,
        };

        let mut rate_limited = 0u32;
        let mut server_errors = 0u32;
        let mut network_errors = 0u32;
        loop {
            match self.client.get(&request) {
                Ok(response) if (200..300).contains(&response.status) => return Ok(response.body),
                Ok(response) if response.status == 429 => {
                    if rate_limited >= self.policy.max_rate_limit_retries {
                        return Err(EntsoeError::RateLimited {
                            attempts: rate_limited + 1,
                        });
                    }
                    self.wait(rate_limited, "rate limited", Some(429));
                    rate_limited += 1;
                }
                Ok(response) if response.status >= 500 => {
                    if server_errors >= self.policy.max_server_retries {
                        return Err(EntsoeError::Transport {
                            message: format!(
                                "upstream server error after {} attempts",
                                server_errors + 1
                            ),
                            status: Some(response.status),
                        });
                    }
                    self.wait(server_errors, "server error", Some(response.status));
                    server_errors += 1;
                }
                Ok(response) => return Err(classify_client_error(&response)),
                Err(err) => {
                    if network_errors >= self.policy.network_retries {
                        let kind = if err.timeout { "timeout" } else { "network failure" };
                        return Err(EntsoeError::Transport {
                            message: format!("{kind}: {err}"),
                            status: None,
                        });
                    }
                    warn!(attempt = network_errors + 1, error = %err, "network failure, retrying");
                    network_errors += 1;
                }
            }
        }
    }
}

impl<C, S: Sleeper> HttpTransport<C, S> {
    fn wait(&self, attempt: u32, reason: &str, status: Option<u16>) {
        let delay = self.policy.backoff(attempt);
        warn!(
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            status,
            "{reason}, backing off"
        );
        self.sleeper.sleep(delay);
    }
}

/// Maps a non-retryable 4xx response onto the error taxonomy.
fn classify_client_error(response: &RawResponse) -> EntsoeError {
    let reason = acknowledgement_reason(&response.body).unwrap_or_else(|| snippet(&response.body));
    match response.status {
        401 | 403 => EntsoeError::Authentication {
            message: if reason.is_empty() {
                "token rejected".to_string()
            } else {
                reason
            },
            status: Some(response.status),
        },
        404 => EntsoeError::NoData(if reason.is_empty() {
            "no data for the requested period".to_string()
        } else {
            reason
        }),
        status => EntsoeError::Rejected { status, reason },
    }
}

fn snippet(body: &str) -> String {
    body.trim().chars().take(200).collect()
}
