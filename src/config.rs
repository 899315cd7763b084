//! TOML-based client configuration and built-in profiles.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::request::RequestOptions;
use crate::transport::{DEFAULT_BASE_URL, RetryPolicy};

/// Environment variables consulted for the security token, in priority order.
pub const TOKEN_ENV_VARS: &[&str] = &["ENTSOE_API_TOKEN", "ENTSOE_TOKEN", "ENTSOE_API_KEY"];

/// Top-level configuration parsed from TOML.
///
/// Every section is optional and defaults to [`AppConfig::default_profile`].
/// Load from TOML with [`AppConfig::from_toml_file`] or pick a built-in
/// profile with [`AppConfig::from_profile`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Upstream endpoint and credentials.
    #[serde(default)]
    pub api: ApiConfig,
    /// Backoff and retry budget.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Request window behaviour.
    #[serde(default)]
    pub request: RequestConfig,
    /// Log filter for the binary.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Upstream REST endpoint.
    pub base_url: String,
    /// Security token; usually supplied through the environment instead.
    pub token: Option<String>,
    /// Per-attempt HTTP timeout in seconds (must be > 0).
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether a non-blank token is configured.
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Backoff and retry budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// First backoff delay (ms, must be > 0).
    pub base_delay_ms: u64,
    /// Backoff ceiling (ms, must be >= base_delay_ms).
    pub max_delay_ms: u64,
    /// Waits allowed after HTTP 429.
    pub max_rate_limit_retries: u32,
    /// Waits allowed after HTTP 5xx.
    pub max_server_retries: u32,
    /// Re-sends allowed after a network failure.
    pub network_retries: u32,
    /// Random extra delay as a fraction of the backoff (0.0–1.0).
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            max_rate_limit_retries: 3,
            max_server_retries: 2,
            network_retries: 1,
            jitter_ratio: 0.0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_rate_limit_retries: self.max_rate_limit_retries,
            max_server_retries: self.max_server_retries,
            network_retries: self.network_retries,
            jitter_ratio: self.jitter_ratio,
        }
    }
}

/// Request window behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestConfig {
    /// Shift actual load/generation windows back by each country's publication delay.
    pub apply_publication_delay: bool,
}

impl RequestConfig {
    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            apply_publication_delay: self.apply_publication_delay,
        }
    }
}

/// Log filter for the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"retry.base_delay_ms"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl AppConfig {
    /// Returns the default profile.
    pub fn default_profile() -> Self {
        Self::default()
    }

    /// Returns the patient profile: longer backoff, more retries, longer timeout.
    pub fn patient() -> Self {
        Self {
            api: ApiConfig {
                timeout_secs: 60,
                ..ApiConfig::default()
            },
            retry: RetryConfig {
                base_delay_ms: 2000,
                max_delay_ms: 120_000,
                max_rate_limit_retries: 6,
                max_server_retries: 4,
                network_retries: 3,
                jitter_ratio: 0.2,
            },
            ..Self::default()
        }
    }

    /// Returns the fail-fast profile: one attempt per request, short timeout.
    pub fn fail_fast() -> Self {
        Self {
            api: ApiConfig {
                timeout_secs: 10,
                ..ApiConfig::default()
            },
            retry: RetryConfig {
                max_rate_limit_retries: 0,
                max_server_retries: 0,
                network_retries: 0,
                ..RetryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available profile names.
    pub const PROFILES: &[&str] = &["default", "patient", "fail_fast"];

    /// Loads a named profile.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the profile name is unknown.
    pub fn from_profile(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default_profile()),
            "patient" => Ok(Self::patient()),
            "fail_fast" => Ok(Self::fail_fast()),
            _ => Err(ConfigError {
                field: "profile".to_string(),
                message: format!(
                    "unknown profile \"{name}\", available: {}",
                    Self::PROFILES.join(", ")
                ),
            }),
        }
    }

    /// Parses configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Fills `api.token` from the first set variable in [`TOKEN_ENV_VARS`]
    /// when the file did not provide one.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Reads one variable; `std::env::var(..).ok()` in production
    pub fn overlay_env_token<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api.has_token() {
            return;
        }
        self.api.token = TOKEN_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. A missing token is
    /// not an error here; requests fail with an authentication envelope.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let api = &self.api;
        if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
            errors.push(ConfigError {
                field: "api.base_url".into(),
                message: format!("must be an http(s) URL, got \"{}\"", api.base_url),
            });
        }
        if api.timeout_secs == 0 {
            errors.push(ConfigError {
                field: "api.timeout_secs".into(),
                message: "must be > 0".into(),
            });
        }

        let r = &self.retry;
        if r.base_delay_ms == 0 {
            errors.push(ConfigError {
                field: "retry.base_delay_ms".into(),
                message: "must be > 0".into(),
            });
        }
        if r.max_delay_ms < r.base_delay_ms {
            errors.push(ConfigError {
                field: "retry.max_delay_ms".into(),
                message: "must be >= retry.base_delay_ms".into(),
            });
        }
        if !(0.0..=1.0).contains(&r.jitter_ratio) {
            errors.push(ConfigError {
                field: "retry.jitter_ratio".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        if self.logging.filter.trim().is_empty() {
            errors.push(ConfigError {
                field: "logging.filter".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}
