//! API query and error types.
//!
//! Query parameter names match the client function arguments; omitted
//! values fall back to the defaults in [`crate::request::builder`].

use serde::{Deserialize, Serialize};

/// `country` plus an optional hour count looking back.
#[derive(Debug, Deserialize)]
pub struct HoursBackQuery {
    pub country: String,
    pub hours_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    pub country: String,
    pub days_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub country: String,
    pub days_ahead: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RenewableQuery {
    pub country: String,
    pub hours_ahead: Option<u32>,
}

/// Cross-border flow query: `from` exports into `to`.
#[derive(Debug, Deserialize)]
pub struct FlowsQuery {
    pub from: String,
    pub to: String,
    pub hours_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub country: String,
    /// Wire name or alias, e.g. `day_ahead_prices` or `prices`.
    pub data_type: String,
    /// Destination country, for flow previews.
    pub to: Option<String>,
}

/// Error response body for requests that never produced an envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Taxonomy code, when the failure maps onto one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// Human-readable error message.
    pub error: String,
}
