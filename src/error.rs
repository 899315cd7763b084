//! Error taxonomy shared by every stage of the request pipeline.

use serde::Serialize;

/// Stable error codes surfaced to callers inside error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    UnsupportedCountry,
    InvalidParameter,
    TransportError,
    RateLimited,
    AuthenticationError,
    NoDataAvailable,
    MalformedResponse,
    AllVariantsFailed,
}

impl ErrorCode {
    /// Taxonomy name as it appears in serialized envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedCountry => "UnsupportedCountry",
            Self::InvalidParameter => "InvalidParameter",
            Self::TransportError => "TransportError",
            Self::RateLimited => "RateLimited",
            Self::AuthenticationError => "AuthenticationError",
            Self::NoDataAvailable => "NoDataAvailable",
            Self::MalformedResponse => "MalformedResponse",
            Self::AllVariantsFailed => "AllVariantsFailed",
        }
    }
}

/// Failure of one stage of a data request.
///
/// Never crosses the public client boundary: the normalizer folds every
/// variant into an error envelope.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntsoeError {
    #[error("unsupported country code: {0}")]
    UnsupportedCountry(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Upstream rejected the request with a 4xx other than 401/403/404/429.
    #[error("request rejected (HTTP {status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },

    #[error("rate limited: gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        status: Option<u16>,
    },

    #[error("no data available: {0}")]
    NoData(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("all {attempts} parameter variants failed; last error: {last}")]
    AllVariantsFailed {
        attempts: usize,
        last: Box<EntsoeError>,
    },
}

impl EntsoeError {
    /// Shorthand for [`EntsoeError::InvalidParameter`].
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Maps the variant onto the public taxonomy.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedCountry(_) => ErrorCode::UnsupportedCountry,
            Self::InvalidParameter { .. } | Self::Rejected { .. } => ErrorCode::InvalidParameter,
            Self::Transport { .. } => ErrorCode::TransportError,
            Self::RateLimited { .. } => ErrorCode::RateLimited,
            Self::Authentication { .. } => ErrorCode::AuthenticationError,
            Self::NoData(_) => ErrorCode::NoDataAvailable,
            Self::Malformed(_) => ErrorCode::MalformedResponse,
            Self::AllVariantsFailed { .. } => ErrorCode::AllVariantsFailed,
        }
    }

    /// Upstream HTTP status that produced this error, when there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { status, .. } | Self::Authentication { status, .. } => *status,
            Self::RateLimited { .. } => Some(429),
            Self::AllVariantsFailed { last, .. } => last.http_status(),
            _ => None,
        }
    }
}
