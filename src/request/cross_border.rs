//! Ordered fallback variants for cross-border flow queries.
//!
//! Upstream publishes flows for some borders only under the reversed domain
//! pair, a realised process type, or the finalised-schedule document. The
//! variants are tried in the order of [`VARIANTS`] and the first one that
//! yields points wins.

use tracing::{debug, info};

use super::{DocumentType, DomainParam, ProcessType, RequestParams, TimeRange};
use crate::error::EntsoeError;
use crate::parser::ParsedSeries;
use crate::registry::CountryConfig;

/// One way of phrasing a flow query.
#[derive(Debug, Clone, Copy)]
pub struct FlowVariant {
    pub label: &'static str,
    /// Values come back with the opposite sign convention and must be negated.
    pub invert: bool,
    build: fn(&CountryConfig, &CountryConfig, TimeRange) -> RequestParams,
}

impl FlowVariant {
    pub fn params(&self, from: &CountryConfig, to: &CountryConfig, window: TimeRange) -> RequestParams {
        (self.build)(from, to, window)
    }
}

fn forward(from: &CountryConfig, to: &CountryConfig, window: TimeRange) -> RequestParams {
    RequestParams::new(DocumentType::PhysicalFlows, window)
        .with_domain(DomainParam::Out, from.area_code)
        .with_domain(DomainParam::In, to.area_code)
}

fn reversed(from: &CountryConfig, to: &CountryConfig, window: TimeRange) -> RequestParams {
    forward(to, from, window)
}

fn realised(from: &CountryConfig, to: &CountryConfig, window: TimeRange) -> RequestParams {
    forward(from, to, window).with_process(ProcessType::Realised)
}

fn scheduled(from: &CountryConfig, to: &CountryConfig, window: TimeRange) -> RequestParams {
    RequestParams {
        document_type: DocumentType::FinalisedSchedule,
        ..forward(from, to, window)
    }
}

/// Variants in the order they are attempted.
pub const VARIANTS: [FlowVariant; 4] = [
    FlowVariant {
        label: "forward",
        invert: false,
        build: forward,
    },
    FlowVariant {
        label: "reversed",
        invert: true,
        build: reversed,
    },
    FlowVariant {
        label: "realised",
        invert: false,
        build: realised,
    },
    FlowVariant {
        label: "scheduled",
        invert: false,
        build: scheduled,
    },
];

/// Data returned by the winning variant.
#[derive(Debug, Clone)]
pub struct VariantOutcome {
    pub label: &'static str,
    pub params: RequestParams,
    pub series: ParsedSeries,
}

/// Tries each variant until one returns a non-empty series.
///
/// `fetch` performs transport and parsing for one parameter set. Values of
/// an inverted variant are negated before returning.
///
/// # Errors
///
/// - [`EntsoeError::Authentication`] from any variant, immediately
/// - [`EntsoeError::AllVariantsFailed`] carrying the last error once every
///   variant has failed or come back empty
pub fn try_variants<F>(
    from: &CountryConfig,
    to: &CountryConfig,
    window: TimeRange,
    mut fetch: F,
) -> Result<VariantOutcome, EntsoeError>
where
    F: FnMut(&RequestParams) -> Result<ParsedSeries, EntsoeError>,
{
    let mut last = EntsoeError::NoData("no variant attempted".to_string());
    for variant in &VARIANTS {
        let params = variant.params(from, to, window);
        debug!(variant = variant.label, from = from.code, to = to.code, "trying flow variant");
        match fetch(&params) {
            Ok(mut series) if !series.points.is_empty() => {
                if variant.invert {
                    series.negate();
                }
                info!(variant = variant.label, points = series.points.len(), "flow variant succeeded");
                return Ok(VariantOutcome {
                    label: variant.label,
                    params,
                    series,
                });
            }
            Ok(_) => {
                last = EntsoeError::NoData(format!("variant {} returned no points", variant.label));
            }
            Err(err @ EntsoeError::Authentication { .. }) => return Err(err),
            Err(err) => {
                debug!(variant = variant.label, error = %err, "flow variant failed");
                last = err;
            }
        }
    }
    Err(EntsoeError::AllVariantsFailed {
        attempts: VARIANTS.len(),
        last: Box::new(last),
    })
}
