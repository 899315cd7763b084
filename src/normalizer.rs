//! Folds pipeline outcomes into [`ResultEnvelope`]s.

use tracing::info;

use crate::envelope::ResultEnvelope;
use crate::error::EntsoeError;
use crate::parser::ParsedSeries;
use crate::registry::{CountryConfig, DataType};
use crate::request::{RequestContext, TimeRange};

/// What is known about a call by the time it finishes or fails.
///
/// Filled in progressively so an early failure still reports whatever
/// context was resolved before it.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub data_type: DataType,
    /// Country code as the caller typed it.
    pub country_input: String,
    pub country: Option<&'static CountryConfig>,
    pub to_country: Option<String>,
    pub window: Option<TimeRange>,
    pub request: Option<RequestContext>,
    pub notes: Vec<String>,
}

impl CallContext {
    pub fn new(data_type: DataType, country_input: &str) -> Self {
        Self {
            data_type,
            country_input: country_input.to_string(),
            country: None,
            to_country: None,
            window: None,
            request: None,
            notes: Vec::new(),
        }
    }

    fn decorate(self, mut envelope: ResultEnvelope) -> ResultEnvelope {
        envelope = match self.country {
            Some(country) => envelope.with_country(country),
            None => envelope.with_country_code(&self.country_input),
        };
        if let Some(to) = &self.to_country {
            envelope = envelope.with_to_country(to);
        }
        if let Some(window) = self.window {
            envelope = envelope.with_time_range(window);
        }
        if let Some(request) = self.request {
            envelope = envelope.with_request(request);
        }
        envelope.with_notes(self.notes)
    }
}

/// Builds the envelope for one call.
///
/// An empty series becomes a `NoDataAvailable` error envelope.
pub fn normalize(ctx: CallContext, outcome: Result<ParsedSeries, EntsoeError>) -> ResultEnvelope {
    let data_type = ctx.data_type;
    match outcome {
        Ok(series) if series.points.is_empty() => {
            let err = EntsoeError::NoData(
                "upstream returned no data points for the requested period".to_string(),
            );
            failure(ctx, &err)
        }
        Ok(series) => {
            info!(
                data_type = %data_type,
                country = %ctx.country_input,
                points = series.points.len(),
                gaps = series.gaps.len(),
                "request succeeded"
            );
            let envelope = ResultEnvelope::success(data_type, series.points).with_gaps(series.gaps);
            ctx.decorate(envelope)
        }
        Err(err) => failure(ctx, &err),
    }
}

fn failure(ctx: CallContext, err: &EntsoeError) -> ResultEnvelope {
    info!(
        data_type = %ctx.data_type,
        country = %ctx.country_input,
        code = err.code().as_str(),
        error = %err,
        "request failed"
    );
    let envelope = ResultEnvelope::failure(ctx.data_type, err);
    ctx.decorate(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{DataPoint, Status};
    use crate::error::ErrorCode;
    use crate::registry::lookup;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn series(values: &[f64]) -> ParsedSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ParsedSeries {
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| DataPoint {
                    timestamp: start + chrono::TimeDelta::hours(i as i64),
                    value: *v,
                    unit: "MW".into(),
                    position: i,
                    metadata: BTreeMap::new(),
                })
                .collect(),
            gaps: Vec::new(),
        }
    }

    #[test]
    fn success_carries_summary_and_country() {
        let mut ctx = CallContext::new(DataType::Load, "de");
        ctx.country = lookup("DE").ok();
        let env = normalize(ctx, Ok(series(&[100.0, 200.0, 300.0])));
        assert_eq!(env.status, Status::Success);
        assert_eq!(env.country.as_deref(), Some("DE"));
        assert_eq!(env.country_name.as_deref(), Some("Germany"));
        assert_eq!(env.summary().avg, 200.0);
        assert_eq!(env.summary().count, 3);
    }

    #[test]
    fn empty_series_is_no_data() {
        let env = normalize(CallContext::new(DataType::Load, "FR"), Ok(ParsedSeries::default()));
        assert_eq!(env.status, Status::Error);
        assert_eq!(env.error.as_ref().map(|e| e.code), Some(ErrorCode::NoDataAvailable));
    }

    #[test]
    fn errors_keep_partial_context() {
        let ctx = CallContext::new(DataType::DayAheadPrices, " xx ");
        let env = normalize(ctx, Err(EntsoeError::UnsupportedCountry("xx".into())));
        assert_eq!(env.country.as_deref(), Some("XX"));
        assert!(env.request.is_none());
        assert_eq!(
            env.error.as_ref().map(|e| e.code),
            Some(ErrorCode::UnsupportedCountry)
        );
    }
}
