//! entsoe-grid entry point: CLI wiring, configuration and logging setup.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use entsoe_grid::cli::{Cli, Command, OutputFormat};
use entsoe_grid::client::EntsoeClient;
use entsoe_grid::config::{AppConfig, ConfigError};
use entsoe_grid::envelope::ResultEnvelope;
use entsoe_grid::io::export::export_csv;

const EXIT_CONFIG: u8 = 1;
const EXIT_ERROR_ENVELOPE: u8 = 2;

/// Resolves configuration: `--config` takes priority, then `--profile`, then defaults.
fn load_config(cli: &Cli) -> Result<AppConfig, Vec<ConfigError>> {
    let mut config = if let Some(ref path) = cli.config {
        AppConfig::from_toml_file(path).map_err(|e| vec![e])?
    } else if let Some(ref name) = cli.profile {
        AppConfig::from_profile(name).map_err(|e| vec![e])?
    } else {
        AppConfig::default_profile()
    };

    config.overlay_env_token(|name| std::env::var(name).ok());

    let errors = config.validate();
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{value}"),
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: failed to encode JSON: {e}"),
        },
    }
}

fn report(envelope: &ResultEnvelope, cli: &Cli) -> ExitCode {
    print(envelope, cli.format);

    if let Some(ref path) = cli.csv_out {
        if envelope.is_success() {
            if let Err(e) = export_csv(envelope.data_points(), path) {
                eprintln!("error: failed to write CSV: {e}");
                return ExitCode::FAILURE;
            }
            eprintln!("Data points written to {}", path.display());
        }
    }

    if envelope.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_ERROR_ENVELOPE)
    }
}

#[cfg(feature = "api")]
fn serve(client: EntsoeClient, host: std::net::IpAddr, port: u16) -> ExitCode {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(entsoe_grid::api::AppState::new(client));
    let addr = SocketAddr::new(host, port);
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let result = rt.block_on(entsoe_grid::api::serve(Arc::clone(&state), addr));
    // The blocking HTTP client must be dropped outside the runtime.
    drop(rt);
    drop(state);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: server failed on {addr}: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            for e in &errors {
                eprintln!("{e}");
            }
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    init_tracing(&config.logging.filter);

    let client = match EntsoeClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match &cli.command {
        Command::Info => {
            print(&client.api_info(), cli.format);
            ExitCode::SUCCESS
        }
        Command::Preview {
            country,
            data_type,
            to,
        } => match client.preview_request(country, *data_type, to.as_deref()) {
            Ok(preview) => {
                print(&preview, cli.format);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(EXIT_ERROR_ENVELOPE)
            }
        },
        #[cfg(feature = "api")]
        Command::Serve { host, port } => serve(client, *host, *port),
        command => match command.fetch(&client) {
            Some(envelope) => report(&envelope, &cli),
            None => ExitCode::SUCCESS,
        },
    }
}
