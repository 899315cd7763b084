//! Per-data-type parameter assembly and request window arithmetic.

use chrono::{DateTime, Days, DurationRound, NaiveTime, TimeDelta, TimeZone, Utc};

use super::{DocumentType, DomainParam, ProcessType, RequestParams, TimeRange};
use crate::error::EntsoeError;
use crate::registry::{CountryConfig, DataType};

/// Longest look-back accepted for hourly actuals and flows.
pub const MAX_HOURS_BACK: u32 = 168;
/// Longest look-back for day-ahead prices.
pub const MAX_DAYS_BACK: u32 = 7;
/// Longest horizon for the day-ahead generation forecast.
pub const MAX_DAYS_AHEAD: u32 = 7;
/// Renewable forecasts beyond this horizon are clamped, not rejected.
pub const MAX_RENEWABLE_HOURS_AHEAD: u32 = 72;
/// Safety margin subtracted from "now" for flow queries.
pub const FLOW_DELAY_HOURS: u32 = 1;

/// Look-back for actual load and generation when the caller gives none.
pub const DEFAULT_ACTUAL_HOURS: u32 = 6;
pub const DEFAULT_PRICE_DAYS: u32 = 1;
pub const DEFAULT_FORECAST_DAYS: u32 = 1;
pub const DEFAULT_RENEWABLE_HOURS: u32 = 48;
pub const DEFAULT_FLOW_HOURS: u32 = 24;
pub const DEFAULT_IMBALANCE_HOURS: u32 = 24;

/// Builder switches taken from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Shift actual load/generation windows back by the country's publication delay.
    pub apply_publication_delay: bool,
}

/// A single-country data request with its range parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRequest {
    Load { hours_back: u32 },
    Generation { hours_back: u32 },
    DayAheadPrices { days_back: u32 },
    GenerationForecast { days_ahead: u32 },
    RenewableForecast { hours_ahead: u32 },
    ImbalancePrices { hours_back: u32 },
}

impl DataRequest {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Load { .. } => DataType::Load,
            Self::Generation { .. } => DataType::Generation,
            Self::DayAheadPrices { .. } => DataType::DayAheadPrices,
            Self::GenerationForecast { .. } => DataType::GenerationForecast,
            Self::RenewableForecast { .. } => DataType::RenewableForecast,
            Self::ImbalancePrices { .. } => DataType::ImbalancePrices,
        }
    }

    /// The request a caller gets when it leaves the range parameter out.
    pub fn with_defaults(data_type: DataType) -> Option<Self> {
        match data_type {
            DataType::Load => Some(Self::Load {
                hours_back: DEFAULT_ACTUAL_HOURS,
            }),
            DataType::Generation => Some(Self::Generation {
                hours_back: DEFAULT_ACTUAL_HOURS,
            }),
            DataType::DayAheadPrices => Some(Self::DayAheadPrices {
                days_back: DEFAULT_PRICE_DAYS,
            }),
            DataType::GenerationForecast => Some(Self::GenerationForecast {
                days_ahead: DEFAULT_FORECAST_DAYS,
            }),
            DataType::RenewableForecast => Some(Self::RenewableForecast {
                hours_ahead: DEFAULT_RENEWABLE_HOURS,
            }),
            DataType::ImbalancePrices => Some(Self::ImbalancePrices {
                hours_back: DEFAULT_IMBALANCE_HOURS,
            }),
            DataType::CrossBorderFlows | DataType::SupportedCountries => None,
        }
    }
}

/// Parameters plus the resolved window, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub data_type: DataType,
    pub params: RequestParams,
    pub window: TimeRange,
    /// Human-readable remarks (delays applied, clamping) for the envelope.
    pub notes: Vec<String>,
}

/// Builds upstream parameters for `request` against `country`.
///
/// # Arguments
///
/// * `request` - Data type and range parameter
/// * `country` - Registry record supplying domain codes and delays
/// * `now` - Anchor instant for the window
/// * `options` - Builder switches from configuration
///
/// # Errors
///
/// Returns [`EntsoeError::InvalidParameter`] when the range parameter is out
/// of bounds or the country does not publish the data type.
pub fn build(
    request: &DataRequest,
    country: &CountryConfig,
    now: DateTime<Utc>,
    options: RequestOptions,
) -> Result<PreparedRequest, EntsoeError> {
    let data_type = request.data_type();
    ensure_supported(country, data_type)?;
    let delays = country.publication_delay;
    let area = country.area_code;
    let mut notes = Vec::new();

    let (params, window) = match *request {
        DataRequest::Load { hours_back } => {
            let hours_back = within("hours_back", hours_back, 1, MAX_HOURS_BACK)?;
            let window = trailing_window(now, actual_delay(country, options, &mut notes), hours_back);
            let params = RequestParams::new(DocumentType::TotalLoad, window)
                .with_process(ProcessType::Realised)
                .with_domain(DomainParam::OutBiddingZone, area);
            (params, window)
        }
        DataRequest::Generation { hours_back } => {
            let hours_back = within("hours_back", hours_back, 1, MAX_HOURS_BACK)?;
            let window = trailing_window(now, actual_delay(country, options, &mut notes), hours_back);
            let params = RequestParams::new(DocumentType::ActualGeneration, window)
                .with_process(ProcessType::Realised)
                .with_domain(DomainParam::In, area);
            (params, window)
        }
        DataRequest::ImbalancePrices { hours_back } => {
            let hours_back = within("hours_back", hours_back, 1, MAX_HOURS_BACK)?;
            let window = trailing_window(now, actual_delay(country, options, &mut notes), hours_back);
            let params = RequestParams::new(DocumentType::ImbalancePrices, window)
                .with_process(ProcessType::Realised)
                .with_domain(DomainParam::ControlArea, area);
            (params, window)
        }
        DataRequest::DayAheadPrices { days_back } => {
            let days_back = within("days_back", days_back, 1, MAX_DAYS_BACK)?;
            let reference = now - TimeDelta::hours(i64::from(delays.price_hours));
            let target = reference
                .date_naive()
                .checked_sub_days(Days::new(u64::from(days_back - 1)))
                .ok_or_else(|| EntsoeError::invalid("days_back", "date out of range"))?;
            let start = Utc.from_utc_datetime(&target.and_time(NaiveTime::MIN));
            let window = TimeRange::new(start, start + TimeDelta::days(1));
            notes.push(format!(
                "Day-ahead prices for {}; data delayed by {} hours",
                target.format("%Y-%m-%d"),
                delays.price_hours
            ));
            let params = RequestParams::new(DocumentType::DayAheadPrices, window)
                .with_domain(DomainParam::In, area)
                .with_domain(DomainParam::Out, area);
            (params, window)
        }
        DataRequest::GenerationForecast { days_ahead } => {
            let days_ahead = within("days_ahead", days_ahead, 1, MAX_DAYS_AHEAD)?;
            let start = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));
            let window = TimeRange::new(start, start + TimeDelta::days(i64::from(days_ahead)));
            let params = RequestParams::new(DocumentType::GenerationForecast, window)
                .with_process(ProcessType::DayAhead)
                .with_domain(DomainParam::In, area);
            (params, window)
        }
        DataRequest::RenewableForecast { hours_ahead } => {
            if hours_ahead == 0 {
                return Err(EntsoeError::invalid("hours_ahead", "must be >= 1"));
            }
            let clamped = hours_ahead.min(MAX_RENEWABLE_HOURS_AHEAD);
            if clamped != hours_ahead {
                notes.push(format!(
                    "hours_ahead clamped from {hours_ahead} to {MAX_RENEWABLE_HOURS_AHEAD}"
                ));
            }
            let start = floor_hour(now - TimeDelta::hours(i64::from(delays.forecast_hours)));
            let window = TimeRange::new(start, start + TimeDelta::hours(i64::from(clamped)));
            notes.push(format!(
                "Forecast window starts {} hours before now",
                delays.forecast_hours
            ));
            let params = RequestParams::new(DocumentType::WindSolarForecast, window)
                .with_process(ProcessType::DayAhead)
                .with_domain(DomainParam::In, area);
            (params, window)
        }
    };

    Ok(PreparedRequest {
        data_type,
        params,
        window,
        notes,
    })
}

/// Window for cross-border flows: `hours_back` hours ending one hour before `now`.
///
/// # Errors
///
/// Returns [`EntsoeError::InvalidParameter`] when `hours_back` is out of bounds.
pub fn flow_window(now: DateTime<Utc>, hours_back: u32) -> Result<TimeRange, EntsoeError> {
    let hours_back = within("hours_back", hours_back, 1, MAX_HOURS_BACK)?;
    Ok(trailing_window(now, FLOW_DELAY_HOURS, hours_back))
}

pub(crate) fn ensure_supported(
    country: &CountryConfig,
    data_type: DataType,
) -> Result<(), EntsoeError> {
    if country.supports(data_type) {
        Ok(())
    } else {
        Err(EntsoeError::invalid(
            "data_type",
            format!("{data_type} is not published for {}", country.code),
        ))
    }
}

fn actual_delay(country: &CountryConfig, options: RequestOptions, notes: &mut Vec<String>) -> u32 {
    if options.apply_publication_delay {
        let hours = country.publication_delay.actual_hours;
        notes.push(format!(
            "Data delayed by {hours} hours due to publication schedule"
        ));
        hours
    } else {
        0
    }
}

fn within(name: &str, value: u32, min: u32, max: u32) -> Result<u32, EntsoeError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(EntsoeError::invalid(
            name,
            format!("must be between {min} and {max}, got {value}"),
        ))
    }
}

fn trailing_window(now: DateTime<Utc>, delay_hours: u32, hours_back: u32) -> TimeRange {
    let end = floor_hour(now - TimeDelta::hours(i64::from(delay_hours)));
    TimeRange::new(end - TimeDelta::hours(i64::from(hours_back)), end)
}

fn floor_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    t.duration_trunc(TimeDelta::hours(1)).unwrap_or(t)
}
