//! Client for the ENTSO-E Transparency Platform REST API.
//!
//! Builds document requests for European electricity market data, sends
//! them with rate-limit aware retries, parses the XML replies and hands
//! back a uniform [`envelope::ResultEnvelope`].

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod client;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod envelope;
pub mod error;
pub mod io {
    pub mod export;
}
pub mod normalizer;
pub mod parser;
pub mod registry;
pub mod request;
pub mod stats;
pub mod transport;
