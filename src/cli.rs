//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::client::EntsoeClient;
use crate::envelope::ResultEnvelope;
use crate::registry::DataType;
use crate::request::builder::{
    DEFAULT_ACTUAL_HOURS, DEFAULT_FLOW_HOURS, DEFAULT_FORECAST_DAYS, DEFAULT_IMBALANCE_HOURS,
    DEFAULT_PRICE_DAYS, DEFAULT_RENEWABLE_HOURS,
};
use crate::transport::Transport;

#[derive(Debug, Parser)]
#[command(name = "entsoe-grid")]
#[command(version, about = "Query European electricity market data from the ENTSO-E Transparency Platform.")]
pub struct Cli {
    /// Load configuration from a TOML file (takes priority over --profile)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Built-in profile: default, patient, fail_fast
    #[arg(long, global = true)]
    pub profile: Option<String>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Also write the data points to a CSV file
    #[arg(long, global = true)]
    pub csv_out: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Actual total load
    Load {
        country: String,
        #[arg(long, default_value_t = DEFAULT_ACTUAL_HOURS)]
        hours_back: u32,
    },
    /// Actual generation per production type
    Generation {
        country: String,
        #[arg(long, default_value_t = DEFAULT_ACTUAL_HOURS)]
        hours_back: u32,
    },
    /// Day-ahead auction prices for one day
    Prices {
        country: String,
        #[arg(long, default_value_t = DEFAULT_PRICE_DAYS)]
        days_back: u32,
    },
    /// Day-ahead generation forecast
    GenerationForecast {
        country: String,
        #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS)]
        days_ahead: u32,
    },
    /// Wind and solar forecast
    RenewableForecast {
        country: String,
        #[arg(long, default_value_t = DEFAULT_RENEWABLE_HOURS)]
        hours_ahead: u32,
    },
    /// Physical cross-border flows from one country into another
    Flows {
        from: String,
        to: String,
        #[arg(long, default_value_t = DEFAULT_FLOW_HOURS)]
        hours_back: u32,
    },
    /// Imbalance prices
    Imbalance {
        country: String,
        #[arg(long, default_value_t = DEFAULT_IMBALANCE_HOURS)]
        hours_back: u32,
    },
    /// List supported countries
    Countries,
    /// Show the upstream request without sending it
    Preview {
        country: String,
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
        /// Destination country for cross_border_flows
        #[arg(long)]
        to: Option<String>,
    },
    /// Show endpoint, token status and code catalogue
    Info,
    /// Serve the REST API
    #[cfg(feature = "api")]
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: std::net::IpAddr,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

impl Command {
    /// Runs a data command; `None` for commands that do not produce an envelope.
    pub fn fetch<T: Transport>(&self, client: &EntsoeClient<T>) -> Option<ResultEnvelope> {
        let envelope = match self {
            Self::Load {
                country,
                hours_back,
            } => client.get_electricity_load(country, *hours_back),
            Self::Generation {
                country,
                hours_back,
            } => client.get_electricity_generation(country, *hours_back),
            Self::Prices { country, days_back } => client.get_day_ahead_prices(country, *days_back),
            Self::GenerationForecast {
                country,
                days_ahead,
            } => client.get_generation_forecast_day_ahead(country, *days_ahead),
            Self::RenewableForecast {
                country,
                hours_ahead,
            } => client.get_renewable_forecast(country, *hours_ahead),
            Self::Flows {
                from,
                to,
                hours_back,
            } => client.get_cross_border_flows(from, to, *hours_back),
            Self::Imbalance {
                country,
                hours_back,
            } => client.get_imbalance_prices(country, *hours_back),
            Self::Countries => client.get_supported_countries(),
            _ => return None,
        };
        Some(envelope)
    }
}

fn parse_data_type(s: &str) -> Result<DataType, String> {
    DataType::parse(s).ok_or_else(|| {
        let names: Vec<&str> = DataType::FETCHABLE.iter().map(|t| t.as_str()).collect();
        format!("unknown data type \"{s}\", expected one of: {}", names.join(", "))
    })
}
