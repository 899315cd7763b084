//! Uniform result envelope returned by every client call.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{EntsoeError, ErrorCode};
use crate::registry::{CountryConfig, DataType};
use crate::request::{RequestContext, TimeRange};
use crate::stats::SummaryStatistics;

/// Points printed by the text rendering before eliding the rest.
const DISPLAY_POINT_LIMIT: usize = 48;

/// One timestamped observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub unit: String,
    /// Zero-based index within the envelope.
    pub position: usize,
    /// Series-level attributes (business type, psr type, domains, resolution).
    pub metadata: BTreeMap<String, String>,
}

/// A run of positions absent from a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    /// Series identifier (`mRID`, or `#n` for the n-th series).
    pub series: String,
    pub start: DateTime<Utc>,
    /// Exclusive end of the missing run.
    pub end: DateTime<Utc>,
    pub missing_points: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Error detail carried by envelopes with [`Status::Error`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl From<&EntsoeError> for ErrorDetail {
    fn from(err: &EntsoeError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            http_status: err.http_status(),
        }
    }
}

/// Outcome of one data request, success or failure.
///
/// Points are private so the summary statistics always match them; use
/// [`ResultEnvelope::replace_points`] to change the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub status: Status,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    summary_statistics: SummaryStatistics,
    data_points: Vec<DataPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<Gap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestContext>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<CountryConfig>,
}

impl ResultEnvelope {
    fn empty(status: Status, data_type: DataType) -> Self {
        Self {
            status,
            data_type,
            country: None,
            country_name: None,
            to_country: None,
            time_range: None,
            summary_statistics: SummaryStatistics::default(),
            data_points: Vec::new(),
            gaps: Vec::new(),
            request: None,
            notes: Vec::new(),
            error: None,
            countries: Vec::new(),
        }
    }

    /// A success envelope holding `points`.
    pub fn success(data_type: DataType, points: Vec<DataPoint>) -> Self {
        let mut envelope = Self::empty(Status::Success, data_type);
        envelope.replace_points(points);
        envelope
    }

    /// An error envelope describing `err`.
    pub fn failure(data_type: DataType, err: &EntsoeError) -> Self {
        let mut envelope = Self::empty(Status::Error, data_type);
        envelope.error = Some(ErrorDetail::from(err));
        envelope
    }

    /// The registry listing returned by `get_supported_countries`.
    pub fn country_listing(countries: &[CountryConfig]) -> Self {
        let mut envelope = Self::empty(Status::Success, DataType::SupportedCountries);
        envelope.countries = countries.to_vec();
        envelope
    }

    pub fn with_country(mut self, country: &CountryConfig) -> Self {
        self.country = Some(country.code.to_string());
        self.country_name = Some(country.name.to_string());
        self
    }

    /// Sets the country from raw caller input, for requests that never resolved one.
    pub fn with_country_code(mut self, code: &str) -> Self {
        self.country = Some(code.trim().to_ascii_uppercase());
        self
    }

    pub fn with_to_country(mut self, code: &str) -> Self {
        self.to_country = Some(code.trim().to_ascii_uppercase());
        self
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_gaps(mut self, gaps: Vec<Gap>) -> Self {
        self.gaps = gaps;
        self
    }

    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes.extend(notes);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn data_points(&self) -> &[DataPoint] {
        &self.data_points
    }

    pub fn summary(&self) -> &SummaryStatistics {
        &self.summary_statistics
    }

    /// Swaps in a new point sequence, re-establishing order and positions and
    /// recomputing the summary.
    pub fn replace_points(&mut self, mut points: Vec<DataPoint>) {
        points.sort_by_key(|p| p.timestamp);
        for (i, p) in points.iter_mut().enumerate() {
            p.position = i;
        }
        self.summary_statistics = SummaryStatistics::from_points(&points);
        self.data_points = points;
    }
}

impl fmt::Display for ResultEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- {} ", self.data_type)?;
        match (&self.country, &self.to_country) {
            (Some(from), Some(to)) => writeln!(f, "{from} -> {to} ---")?,
            (Some(country), None) => writeln!(f, "{country} ---")?,
            _ => writeln!(f, "---")?,
        }

        if let Some(err) = &self.error {
            write!(f, "Error [{}]: {}", err.code.as_str(), err.message)?;
            if let Some(status) = err.http_status {
                write!(f, " (HTTP {status})")?;
            }
            return Ok(());
        }

        if !self.countries.is_empty() {
            for c in &self.countries {
                writeln!(f, "{:<3} {:<16} {}", c.code, c.area_code, c.name)?;
            }
            return write!(f, "{} countries", self.countries.len());
        }

        if let Some(range) = &self.time_range {
            writeln!(f, "Range:       {range} UTC")?;
        }
        if let Some(variant) = self.request.as_ref().and_then(|r| r.variant) {
            writeln!(f, "Variant:     {variant}")?;
        }
        writeln!(f, "{}", self.summary_statistics)?;
        for note in &self.notes {
            writeln!(f, "Note:        {note}")?;
        }
        for gap in &self.gaps {
            writeln!(
                f,
                "Gap:         {} missing from {} in series {}",
                gap.missing_points,
                gap.start.format("%Y-%m-%d %H:%M"),
                gap.series
            )?;
        }
        for p in self.data_points.iter().take(DISPLAY_POINT_LIMIT) {
            writeln!(
                f,
                "{:>4}  {}  {:>12.2} {}",
                p.position,
                p.timestamp.format("%Y-%m-%d %H:%M"),
                p.value,
                p.unit
            )?;
        }
        if self.data_points.len() > DISPLAY_POINT_LIMIT {
            writeln!(
                f,
                "... {} more points",
                self.data_points.len() - DISPLAY_POINT_LIMIT
            )?;
        }
        Ok(())
    }
}
