//! REST API over the client, for the dashboard front end.
//!
//! Every data route returns the [`ResultEnvelope`](crate::envelope::ResultEnvelope)
//! as JSON with an HTTP status derived from it:
//! - `/countries`: registry listing
//! - `/load`, `/generation`, `/imbalance`: `country`, `hours_back`
//! - `/prices`: `country`, `days_back`
//! - `/forecast/generation`: `country`, `days_ahead`
//! - `/forecast/renewable`: `country`, `hours_ahead`
//! - `/flows`: `from`, `to`, `hours_back`
//! - `/preview`: `country`, `data_type`, optional `to`

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::client::EntsoeClient;
use crate::transport::{HttpTransport, Transport};

pub use handlers::status_for;

/// Application state shared across all request handlers.
///
/// The client is read-only and `Sync`, so handlers share it through an
/// `Arc` without locking.
pub struct AppState<T = HttpTransport> {
    pub client: EntsoeClient<T>,
}

impl<T> AppState<T> {
    pub fn new(client: EntsoeClient<T>) -> Self {
        Self { client }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router<T>(state: Arc<AppState<T>>) -> Router
where
    T: Transport + Send + Sync + 'static,
{
    Router::new()
        .route("/countries", get(handlers::countries::<T>))
        .route("/load", get(handlers::load::<T>))
        .route("/generation", get(handlers::generation::<T>))
        .route("/prices", get(handlers::prices::<T>))
        .route("/forecast/generation", get(handlers::generation_forecast::<T>))
        .route("/forecast/renewable", get(handlers::renewable_forecast::<T>))
        .route("/flows", get(handlers::flows::<T>))
        .route("/imbalance", get(handlers::imbalance::<T>))
        .route("/preview", get(handlers::preview::<T>))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve<T>(state: Arc<AppState<T>>, addr: SocketAddr) -> io::Result<()>
where
    T: Transport + Send + Sync + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
