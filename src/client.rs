//! Caller-facing data functions.
//!
//! Every fetch runs registry lookup, request building, transport, parsing
//! and normalization in sequence and returns a [`ResultEnvelope`]. Failures
//! are reported inside the envelope, never as a `Result` or a panic.

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::diagnostics::{ApiInfo, PreviewEntry, RequestPreview};
use crate::envelope::ResultEnvelope;
use crate::error::EntsoeError;
use crate::normalizer::{CallContext, normalize};
use crate::parser::{self, ParsedSeries};
use crate::registry::{self, CountryConfig, DataType};
use crate::request::builder::{self, DEFAULT_FLOW_HOURS, ensure_supported, flow_window};
use crate::request::cross_border::{self, VARIANTS};
use crate::request::{DataRequest, RequestOptions, RequestParams};
use crate::transport::{HttpTransport, ReqwestClient, ThreadSleeper, Transport, preview_url};

/// Synchronous client for the transparency platform.
///
/// Generic over the [`Transport`] so tests can substitute canned responses.
pub struct EntsoeClient<T = HttpTransport> {
    transport: T,
    clock: Box<dyn Clock + Send + Sync>,
    options: RequestOptions,
}

impl EntsoeClient {
    /// Builds the production client from configuration.
    ///
    /// Must be called outside of an async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`EntsoeError::Transport`] when the HTTP client cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Self, EntsoeError> {
        let transport = HttpTransport::new(
            ReqwestClient::new(config.api.timeout())?,
            ThreadSleeper,
            config.retry.policy(),
            config.api.base_url.clone(),
            config.api.token.clone(),
        );
        Ok(Self::new(transport).with_options(config.request.options()))
    }
}

impl<T: Transport> EntsoeClient<T> {
    /// Wraps `transport` with the system clock and default options.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            clock: Box::new(SystemClock),
            options: RequestOptions::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }


    /// Actual total load (A65) for the last `hours_back` hours.
    pub fn get_electricity_load(&self, country: &str, hours_back: u32) -> ResultEnvelope {
        self.fetch(country, DataRequest::Load { hours_back })
    }

    /// Actual generation per production type (A75) for the last `hours_back` hours.
    pub fn get_electricity_generation(&self, country: &str, hours_back: u32) -> ResultEnvelope {
        self.fetch(country, DataRequest::Generation { hours_back })
    }

    /// Day-ahead auction prices (A44) for one whole day, `days_back` days ago.
    pub fn get_day_ahead_prices(&self, country: &str, days_back: u32) -> ResultEnvelope {
        self.fetch(country, DataRequest::DayAheadPrices { days_back })
    }

    /// Day-ahead generation forecast (A71) from today for `days_ahead` days.
    pub fn get_generation_forecast_day_ahead(&self, country: &str, days_ahead: u32) -> ResultEnvelope {
        self.fetch(country, DataRequest::GenerationForecast { days_ahead })
    }

    /// Wind and solar forecast (A69); horizons beyond 72 h are clamped.
    pub fn get_renewable_forecast(&self, country: &str, hours_ahead: u32) -> ResultEnvelope {
        self.fetch(country, DataRequest::RenewableForecast { hours_ahead })
    }

    /// Imbalance prices (A85) for the control area over the last `hours_back` hours.
    pub fn get_imbalance_prices(&self, country: &str, hours_back: u32) -> ResultEnvelope {
        self.fetch(country, DataRequest::ImbalancePrices { hours_back })
    }

    /// Physical flows (A11) from `from` into `to`, trying the fallback variants in order.
    pub fn get_cross_border_flows(&self, from: &str, to: &str, hours_back: u32) -> ResultEnvelope {
        let mut ctx = CallContext::new(DataType::CrossBorderFlows, from);
        ctx.to_country = Some(to.to_string());
        info!(from, to, hours_back, "fetching cross-border flows");
        let outcome = self.flows(from, to, hours_back, &mut ctx);
        normalize(ctx, outcome)
    }

    /// Lists the country registry.
    pub fn get_supported_countries(&self) -> ResultEnvelope {
        ResultEnvelope::country_listing(registry::supported_countries())
    }

    /// Shows the upstream calls a request would make, with the token masked.
    ///
    /// `to_country` is required for [`DataType::CrossBorderFlows`], which
    /// previews every fallback variant with the default look-back.
    ///
    /// # Errors
    ///
    /// Registry and builder errors, exactly as the fetch would report them.
    pub fn preview_request(
        &self,
        country: &str,
        data_type: DataType,
        to_country: Option<&str>,
    ) -> Result<RequestPreview, EntsoeError> {
        let from = registry::lookup(country)?;
        let now = self.clock.now();
        let base_url = self.transport.base_url();
        let token = self.transport.token();

        if data_type == DataType::CrossBorderFlows {
            let to_code = to_country
                .ok_or_else(|| EntsoeError::invalid("to_country", "required for cross_border_flows"))?;
            let to = registry::lookup(to_code)?;
            check_flow_pair(from, to)?;
            let window = flow_window(now, DEFAULT_FLOW_HOURS)?;
            let requests = VARIANTS
                .iter()
                .map(|variant| {
                    let params = variant.params(from, to, window);
                    PreviewEntry {
                        variant: Some(variant.label),
                        url: preview_url(base_url, token, &params),
                        params: params.context(),
                    }
                })
                .collect();
            return Ok(RequestPreview {
                data_type,
                country: from.code.to_string(),
                to_country: Some(to.code.to_string()),
                window,
                requests,
                notes: Vec::new(),
            });
        }

        let request = DataRequest::with_defaults(data_type).ok_or_else(|| {
            EntsoeError::invalid("data_type", format!("{data_type} has no upstream request"))
        })?;
        let prepared = builder::build(&request, from, now, self.options)?;
        Ok(RequestPreview {
            data_type,
            country: from.code.to_string(),
            to_country: None,
            window: prepared.window,
            requests: vec![PreviewEntry {
                variant: None,
                url: preview_url(base_url, token, &prepared.params),
                params: prepared.params.context(),
            }],
            notes: prepared.notes,
        })
    }

    /// Endpoint, catalogue and registry summary.
    pub fn api_info(&self) -> ApiInfo {
        ApiInfo {
            base_url: self.transport.base_url().to_string(),
            token_configured: self.transport.token().is_some_and(|t| !t.trim().is_empty()),
            data_types: DataType::FETCHABLE.to_vec(),
            document_types: ApiInfo::document_catalogue(),
            process_types: ApiInfo::process_catalogue(),
            countries: registry::supported_countries().iter().map(|c| c.code).collect(),
        }
    }

    fn fetch(&self, country: &str, request: DataRequest) -> ResultEnvelope {
        let mut ctx = CallContext::new(request.data_type(), country);
        info!(data_type = %request.data_type(), country, "fetching");
        let outcome = self.run(country, &request, &mut ctx);
        normalize(ctx, outcome)
    }

    fn run(
        &self,
        country: &str,
        request: &DataRequest,
        ctx: &mut CallContext,
    ) -> Result<ParsedSeries, EntsoeError> {
        let config = registry::lookup(country)?;
        ctx.country = Some(config);
        let prepared = builder::build(request, config, self.clock.now(), self.options)?;
        ctx.window = Some(prepared.window);
        ctx.request = Some(prepared.params.context());
        ctx.notes.extend(prepared.notes);
        self.fetch_params(&prepared.params)
    }

    fn flows(
        &self,
        from: &str,
        to: &str,
        hours_back: u32,
        ctx: &mut CallContext,
    ) -> Result<ParsedSeries, EntsoeError> {
        let from = registry::lookup(from)?;
        ctx.country = Some(from);
        let to = registry::lookup(to)?;
        ctx.to_country = Some(to.code.to_string());
        check_flow_pair(from, to)?;
        let window = flow_window(self.clock.now(), hours_back)?;
        ctx.window = Some(window);

        match cross_border::try_variants(from, to, window, |params| self.fetch_params(params)) {
            Ok(outcome) => {
                let mut request = outcome.params.context();
                request.variant = Some(outcome.label);
                ctx.request = Some(request);
                if outcome.label != VARIANTS[0].label {
                    ctx.notes.push(format!(
                        "Data obtained with the {} parameter variant",
                        outcome.label
                    ));
                }
                Ok(outcome.series)
            }
            Err(err) => {
                ctx.request = Some(VARIANTS[0].params(from, to, window).context());
                Err(err)
            }
        }
    }

    fn fetch_params(&self, params: &RequestParams) -> Result<ParsedSeries, EntsoeError> {
        let body = self.transport.send(params)?;
        parser::parse(&body)
    }
}

fn check_flow_pair(from: &CountryConfig, to: &CountryConfig) -> Result<(), EntsoeError> {
    if from.code == to.code {
        return Err(EntsoeError::invalid(
            "to_country",
            "must differ from the source country",
        ));
    }
    ensure_supported(from, DataType::CrossBorderFlows)?;
    ensure_supported(to, DataType::CrossBorderFlows)
}
