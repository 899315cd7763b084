//! Static country registry: ENTSO-E area codes and per-country publication quirks.

use std::fmt;

use serde::Serialize;

use crate::error::EntsoeError;

/// Category of data a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[serde(rename = "electricity_load")]
    Load,
    #[serde(rename = "electricity_generation")]
    Generation,
    DayAheadPrices,
    #[serde(rename = "generation_forecast_day_ahead")]
    GenerationForecast,
    RenewableForecast,
    CrossBorderFlows,
    ImbalancePrices,
    SupportedCountries,
}

impl DataType {
    /// Every data type that maps onto an upstream document.
    pub const FETCHABLE: &[DataType] = &[
        DataType::Load,
        DataType::Generation,
        DataType::DayAheadPrices,
        DataType::GenerationForecast,
        DataType::RenewableForecast,
        DataType::CrossBorderFlows,
        DataType::ImbalancePrices,
    ];

    /// Wire name used in envelopes and the REST API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "electricity_load",
            Self::Generation => "electricity_generation",
            Self::DayAheadPrices => "day_ahead_prices",
            Self::GenerationForecast => "generation_forecast_day_ahead",
            Self::RenewableForecast => "renewable_forecast",
            Self::CrossBorderFlows => "cross_border_flows",
            Self::ImbalancePrices => "imbalance_prices",
            Self::SupportedCountries => "supported_countries",
        }
    }

    /// Parses a wire name or one of the short aliases (`load`, `prices`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::FETCHABLE
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
            .or(match name.as_str() {
                "load" => Some(Self::Load),
                "generation" => Some(Self::Generation),
                "prices" => Some(Self::DayAheadPrices),
                "generation_forecast" | "forecast" => Some(Self::GenerationForecast),
                "renewables" | "renewable" => Some(Self::RenewableForecast),
                "flows" => Some(Self::CrossBorderFlows),
                "imbalance" => Some(Self::ImbalancePrices),
                _ => None,
            })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hours between real time and upstream publication, per data family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublicationDelay {
    /// Actual load and generation.
    pub actual_hours: u32,
    /// Day-ahead auction results.
    pub price_hours: u32,
    /// Wind and solar forecasts.
    pub forecast_hours: u32,
}

/// Immutable registry record for one supported country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountryConfig {
    /// ISO 3166 alpha-2 code, upper case.
    pub code: &'static str,
    /// EIC area / bidding-zone code used in domain parameters.
    pub area_code: &'static str,
    /// English display name.
    pub name: &'static str,
    pub publication_delay: PublicationDelay,
    pub supported_types: &'static [DataType],
}

impl CountryConfig {
    /// Whether the upstream publishes `data_type` for this country.
    pub fn supports(&self, data_type: DataType) -> bool {
        self.supported_types.contains(&data_type)
    }
}

const fn delay(actual_hours: u32, price_hours: u32, forecast_hours: u32) -> PublicationDelay {
    PublicationDelay {
        actual_hours,
        price_hours,
        forecast_hours,
    }
}

const fn country(
    code: &'static str,
    area_code: &'static str,
    name: &'static str,
    publication_delay: PublicationDelay,
) -> CountryConfig {
    CountryConfig {
        code,
        area_code,
        name,
        publication_delay,
        // Every listed country publishes the full fetchable set; gaps in
        // coverage surface per request as NoDataAvailable.
        supported_types: DataType::FETCHABLE,
    }
}

static COUNTRIES: [CountryConfig; 17] = [
    country("DE", "10Y1001A1001A83F", "Germany", delay(48, 24, 6)),
    country("FR", "10YFR-RTE------C", "France", delay(36, 24, 6)),
    country("IT", "10YIT-GRTN-----B", "Italy", delay(36, 12, 8)),
    country("ES", "10YES-REE------0", "Spain", delay(36, 24, 6)),
    country("NL", "10YNL----------L", "Netherlands", delay(36, 24, 6)),
    country("BE", "10YBE----------2", "Belgium", delay(36, 24, 6)),
    country("AT", "10YAT-APG------L", "Austria", delay(48, 24, 6)),
    country("CH", "10YCH-SWISSGRIDZ", "Switzerland", delay(36, 24, 8)),
    country("PL", "10YPL-AREA-----S", "Poland", delay(36, 24, 8)),
    country("CZ", "10YCZ-CEPS-----N", "Czech Republic", delay(24, 24, 6)),
    country("DK", "10Y1001A1001A65H", "Denmark", delay(36, 24, 4)),
    country("SE", "10YSE-1--------K", "Sweden", delay(36, 24, 6)),
    country("NO", "10YNO-0--------C", "Norway", delay(36, 24, 6)),
    country("FI", "10YFI-1--------U", "Finland", delay(36, 24, 6)),
    country("GB", "10Y1001A1001A92E", "Great Britain", delay(36, 24, 6)),
    country("IE", "10YIE-1001A00010", "Ireland", delay(36, 24, 6)),
    country("PT", "10YPT-REN------W", "Portugal", delay(36, 24, 6)),
];

/// Looks up a country by ISO code, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns [`EntsoeError::UnsupportedCountry`] for codes outside the table.
pub fn lookup(code: &str) -> Result<&'static CountryConfig, EntsoeError> {
    let wanted = code.trim();
    COUNTRIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| EntsoeError::UnsupportedCountry(code.to_string()))
}

/// All registered countries in table order.
pub fn supported_countries() -> &'static [CountryConfig] {
    &COUNTRIES
}
