//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::AppState;
use super::types::{
    ErrorResponse, FlowsQuery, ForecastQuery, HoursBackQuery, PreviewQuery, PricesQuery,
    RenewableQuery,
};
use crate::client::EntsoeClient;
use crate::envelope::{ResultEnvelope, Status};
use crate::error::{EntsoeError, ErrorCode};
use crate::registry::DataType;
use crate::request::builder::{
    DEFAULT_ACTUAL_HOURS, DEFAULT_FLOW_HOURS, DEFAULT_FORECAST_DAYS, DEFAULT_IMBALANCE_HOURS,
    DEFAULT_PRICE_DAYS, DEFAULT_RENEWABLE_HOURS,
};
use crate::transport::Transport;

/// HTTP status reported for an envelope.
///
/// 200 for success; 400 for caller mistakes; 404 when upstream has no data;
/// 429 when rate limited; 502 for everything upstream-side.
pub fn status_for(envelope: &ResultEnvelope) -> StatusCode {
    match (envelope.status, envelope.error.as_ref().map(|e| e.code)) {
        (Status::Success, _) => StatusCode::OK,
        (_, Some(ErrorCode::UnsupportedCountry | ErrorCode::InvalidParameter)) => {
            StatusCode::BAD_REQUEST
        }
        (_, Some(ErrorCode::NoDataAvailable)) => StatusCode::NOT_FOUND,
        (_, Some(ErrorCode::RateLimited)) => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Runs a blocking client call off the async executor.
async fn run<T, F>(state: Arc<AppState<T>>, call: F) -> Response
where
    T: Transport + Send + Sync + 'static,
    F: FnOnce(&EntsoeClient<T>) -> ResultEnvelope + Send + 'static,
{
    match tokio::task::spawn_blocking(move || call(&state.client)).await {
        Ok(envelope) => (status_for(&envelope), Json(envelope)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                code: None,
                error: format!("request worker failed: {e}"),
            }),
        )
            .into_response(),
    }
}

/// `GET /countries` → 200 + registry listing
pub async fn countries<T>(State(state): State<Arc<AppState<T>>>) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let envelope = state.client.get_supported_countries();
    (status_for(&envelope), Json(envelope)).into_response()
}

/// `GET /load?country=DE&hours_back=6`
pub async fn load<T>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<HoursBackQuery>,
) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let hours = q.hours_back.unwrap_or(DEFAULT_ACTUAL_HOURS);
    run(state, move |c| c.get_electricity_load(&q.country, hours)).await
}

/// `GET /generation?country=DE&hours_back=6`
pub async fn generation<T>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<HoursBackQuery>,
) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let hours = q.hours_back.unwrap_or(DEFAULT_ACTUAL_HOURS);
    run(state, move |c| c.get_electricity_generation(&q.country, hours)).await
}

/// `GET /prices?country=FR&days_back=1`
pub async fn prices<T>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<PricesQuery>,
) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let days = q.days_back.unwrap_or(DEFAULT_PRICE_DAYS);
    run(state, move |c| c.get_day_ahead_prices(&q.country, days)).await
}

/// `GET /forecast/generation?country=ES&days_ahead=1`
pub async fn generation_forecast<T>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<ForecastQuery>,
) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let days = q.days_ahead.unwrap_or(DEFAULT_FORECAST_DAYS);
    run(state, move |c| {
        c.get_generation_forecast_day_ahead(&q.country, days)
    })
    .await
}

/// `GET /forecast/renewable?country=DK&hours_ahead=48`
pub async fn renewable_forecast<T>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<RenewableQuery>,
) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let hours = q.hours_ahead.unwrap_or(DEFAULT_RENEWABLE_HOURS);
    run(state, move |c| c.get_renewable_forecast(&q.country, hours)).await
}

/// `GET /flows?from=DE&to=FR&hours_back=24`
pub async fn flows<T>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<FlowsQuery>,
) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let hours = q.hours_back.unwrap_or(DEFAULT_FLOW_HOURS);
    run(state, move |c| c.get_cross_border_flows(&q.from, &q.to, hours)).await
}

/// `GET /imbalance?country=NL&hours_back=24`
pub async fn imbalance<T>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<HoursBackQuery>,
) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let hours = q.hours_back.unwrap_or(DEFAULT_IMBALANCE_HOURS);
    run(state, move |c| c.get_imbalance_prices(&q.country, hours)).await
}

/// `GET /preview?country=DE&data_type=prices` → 200 + preview, or 400
pub async fn preview<T>(
    State(state): State<Arc<AppState<T>>>,
    Query(q): Query<PreviewQuery>,
) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let Some(data_type) = DataType::parse(&q.data_type) else {
        return bad_request(&EntsoeError::invalid(
            "data_type",
            format!("unknown data type \"{}\"", q.data_type),
        ));
    };
    match state
        .client
        .preview_request(&q.country, data_type, q.to.as_deref())
    {
        Ok(preview) => Json(preview).into_response(),
        Err(err) => bad_request(&err),
    }
}

fn bad_request(err: &EntsoeError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            code: Some(err.code().as_str()),
            error: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::clock::FixedClock;
    use crate::request::RequestParams;

    const PRICES: &str = r#"<Publication_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:3">
  <TimeSeries>
    <currency_Unit.name>EUR</currency_Unit.name>
    <price_Measure_Unit.name>MWH</price_Measure_Unit.name>
    <Period>
      <timeInterval><start>2024-03-09T00:00Z</start><end>2024-03-09T03:00Z</end></timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>50</price.amount></Point>
      <Point><position>2</position><price.amount>60</price.amount></Point>
      <Point><position>3</position><price.amount>70</price.amount></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#;

    fn upstream(params: &RequestParams) -> Result<String, EntsoeError> {
        match params.document_type.code() {
            "A44" => Ok(PRICES.to_string()),
            "A65" => Err(EntsoeError::RateLimited { attempts: 4 }),
            _ => Err(EntsoeError::NoData("nothing published".into())),
        }
    }

    fn make_test_state() -> Arc<AppState<fn(&RequestParams) -> Result<String, EntsoeError>>> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap());
        let client = EntsoeClient::new(upstream as fn(&RequestParams) -> Result<String, EntsoeError>)
            .with_clock(clock);
        Arc::new(AppState::new(client))
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn prices_return_200_with_summary() {
        let (status, json) = get("/prices?country=FR").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["summary_statistics"]["avg"], 60.0);
        assert_eq!(json["data_points"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["data_points"][0]["unit"], "EUR/MWH");
    }

    #[tokio::test]
    async fn countries_lists_registry() {
        let (status, json) = get("/countries").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["countries"].as_array().map(Vec::len), Some(17));
    }

    #[tokio::test]
    async fn unsupported_country_is_400() {
        let (status, json) = get("/load?country=US").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "UnsupportedCountry");
    }

    #[tokio::test]
    async fn rate_limit_is_429() {
        let (status, json) = get("/load?country=DE&hours_back=3").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["code"], "RateLimited");
    }

    #[tokio::test]
    async fn no_data_is_404() {
        let (status, _) = get("/generation?country=DE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn exhausted_flow_variants_are_502() {
        let (status, json) = get("/flows?from=DE&to=FR").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "AllVariantsFailed");
        assert_eq!(json["to_country"], "FR");
    }

    #[tokio::test]
    async fn missing_country_is_rejected() {
        let (status, _) = get("/prices").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preview_returns_params() {
        let (status, json) = get("/preview?country=DE&data_type=load").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["requests"][0]["params"]["document_type"], "A65");

        let (status, json) = get("/preview?country=DE&data_type=weather").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "InvalidParameter");
    }
}
