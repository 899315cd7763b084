//! Upstream query parameters and the builders that assemble them.
//!
//! - [`builder`] turns a caller request into [`RequestParams`] and a window
//! - [`cross_border`] holds the ordered fallback variants for flow queries

pub mod builder;
pub mod cross_border;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use builder::{DataRequest, PreparedRequest, RequestOptions};

/// Timestamp layout for `periodStart` / `periodEnd`.
pub const PERIOD_FORMAT: &str = "%Y%m%d%H%M";

/// Upstream `documentType` codes used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentType {
    /// A09: finalised schedule.
    FinalisedSchedule,
    /// A11: aggregated energy data (physical flows).
    PhysicalFlows,
    /// A44: price document.
    DayAheadPrices,
    /// A65: system total load.
    TotalLoad,
    /// A69: wind and solar forecast.
    WindSolarForecast,
    /// A71: generation forecast.
    GenerationForecast,
    /// A75: actual generation per type.
    ActualGeneration,
    /// A85: imbalance prices.
    ImbalancePrices,
}

impl DocumentType {
    pub const ALL: &[DocumentType] = &[
        DocumentType::FinalisedSchedule,
        DocumentType::PhysicalFlows,
        DocumentType::DayAheadPrices,
        DocumentType::TotalLoad,
        DocumentType::WindSolarForecast,
        DocumentType::GenerationForecast,
        DocumentType::ActualGeneration,
        DocumentType::ImbalancePrices,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::FinalisedSchedule => "A09",
            Self::PhysicalFlows => "A11",
            Self::DayAheadPrices => "A44",
            Self::TotalLoad => "A65",
            Self::WindSolarForecast => "A69",
            Self::GenerationForecast => "A71",
            Self::ActualGeneration => "A75",
            Self::ImbalancePrices => "A85",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FinalisedSchedule => "Finalised schedule",
            Self::PhysicalFlows => "Cross-border physical flows",
            Self::DayAheadPrices => "Day-ahead prices",
            Self::TotalLoad => "Actual total load",
            Self::WindSolarForecast => "Wind and solar forecast",
            Self::GenerationForecast => "Generation forecast",
            Self::ActualGeneration => "Actual generation per production type",
            Self::ImbalancePrices => "Imbalance prices",
        }
    }
}

/// Upstream `processType` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessType {
    /// A01
    DayAhead,
    /// A02
    IntradayIncremental,
    /// A16
    Realised,
    /// A18
    IntradayTotal,
    /// A31
    WeekAhead,
}

impl ProcessType {
    pub const ALL: &[ProcessType] = &[
        ProcessType::DayAhead,
        ProcessType::IntradayIncremental,
        ProcessType::Realised,
        ProcessType::IntradayTotal,
        ProcessType::WeekAhead,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::DayAhead => "A01",
            Self::IntradayIncremental => "A02",
            Self::Realised => "A16",
            Self::IntradayTotal => "A18",
            Self::WeekAhead => "A31",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::DayAhead => "Day ahead",
            Self::IntradayIncremental => "Intraday incremental",
            Self::Realised => "Realised",
            Self::IntradayTotal => "Intraday total",
            Self::WeekAhead => "Week ahead",
        }
    }
}

/// Name of a domain query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainParam {
    In,
    Out,
    OutBiddingZone,
    ControlArea,
}

impl DomainParam {
    pub fn key(self) -> &'static str {
        match self {
            Self::In => "in_Domain",
            Self::Out => "out_Domain",
            Self::OutBiddingZone => "outBiddingZone_Domain",
            Self::ControlArea => "controlArea_Domain",
        }
    }
}

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Fully-formed upstream query, minus the security token.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub document_type: DocumentType,
    pub process_type: Option<ProcessType>,
    pub domains: Vec<(DomainParam, &'static str)>,
    pub period: TimeRange,
}

impl RequestParams {
    /// Creates parameters without a process type or domains.
    pub fn new(document_type: DocumentType, period: TimeRange) -> Self {
        Self {
            document_type,
            process_type: None,
            domains: Vec::new(),
            period,
        }
    }

    pub fn with_process(mut self, process_type: ProcessType) -> Self {
        self.process_type = Some(process_type);
        self
    }

    pub fn with_domain(mut self, param: DomainParam, area_code: &'static str) -> Self {
        self.domains.push((param, area_code));
        self
    }

    /// Value of one domain parameter, if set.
    pub fn domain(&self, param: DomainParam) -> Option<&'static str> {
        self.domains
            .iter()
            .find(|(p, _)| *p == param)
            .map(|(_, code)| *code)
    }

    /// Query pairs in upstream order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("documentType", self.document_type.code().to_string())];
        if let Some(process) = self.process_type {
            query.push(("processType", process.code().to_string()));
        }
        for (param, code) in &self.domains {
            query.push((param.key(), (*code).to_string()));
        }
        query.push(("periodStart", self.period.start.format(PERIOD_FORMAT).to_string()));
        query.push(("periodEnd", self.period.end.format(PERIOD_FORMAT).to_string()));
        query
    }

    /// Serializable summary echoed back inside envelopes.
    pub fn context(&self) -> RequestContext {
        RequestContext {
            document_type: self.document_type.code(),
            process_type: self.process_type.map(ProcessType::code),
            domains: self
                .domains
                .iter()
                .map(|(p, code)| (p.key(), *code))
                .collect(),
            period_start: self.period.start.format(PERIOD_FORMAT).to_string(),
            period_end: self.period.end.format(PERIOD_FORMAT).to_string(),
            variant: None,
        }
    }
}

/// Request echo carried by envelopes; never contains the token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestContext {
    pub document_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_type: Option<&'static str>,
    pub domains: BTreeMap<&'static str, &'static str>,
    pub period_start: String,
    pub period_end: String,
    /// Cross-border fallback variant that produced the data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<&'static str>,
}
