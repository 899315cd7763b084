//! Retry and status classification of the HTTP transport, driven through the client.

mod common;

use std::time::Duration;

use entsoe_grid::client::EntsoeClient;
use entsoe_grid::error::ErrorCode;
use entsoe_grid::registry::DataType;
use entsoe_grid::transport::http::{NetworkError, RawResponse, ReqwestClient};
use entsoe_grid::transport::retry::{HttpTransport, RetryPolicy, ThreadSleeper};
use entsoe_grid::transport::{DEFAULT_BASE_URL, Transport};

use common::*;

fn policy() -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(250),
        ..RetryPolicy::default()
    }
}

fn client<'a>(
    http: &'a ScriptedHttp,
    sleeper: &'a RecordingSleeper,
    token: Option<&str>,
) -> EntsoeClient<impl Transport + 'a> {
    let transport = HttpTransport::new(
        http,
        sleeper,
        policy(),
        DEFAULT_BASE_URL,
        token.map(str::to_string),
    );
    EntsoeClient::new(transport).with_clock(fixed_clock())
}

#[test]
fn rate_limit_recovers_within_budget() {
    let http = ScriptedHttp::repeat(429, 3, RawResponse::new(200, LOAD_XML));
    let sleeper = RecordingSleeper::default();
    let env = client(&http, &sleeper, Some("secret-token")).get_electricity_load("FR", 6);

    assert!(env.is_success(), "{env}");
    assert_eq!(http.calls(), 4);
    assert_eq!(
        sleeper.delays(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(250),
        ]
    );
}

#[test]
fn rate_limit_exhausted_after_four_attempts() {
    let http = ScriptedHttp::repeat(429, 4, RawResponse::new(200, LOAD_XML));
    let sleeper = RecordingSleeper::default();
    let env = client(&http, &sleeper, Some("secret-token")).get_electricity_load("FR", 6);

    assert_eq!(http.calls(), 4);
    assert_eq!(sleeper.delays().len(), 3);
    let error = env.error.expect("error detail");
    assert_eq!(error.code, ErrorCode::RateLimited);
    assert!(error.message.contains("4 attempts"));
}

#[test]
fn server_errors_retry_twice_then_fail() {
    let http = ScriptedHttp::repeat(503, 3, RawResponse::new(200, LOAD_XML));
    let sleeper = RecordingSleeper::default();
    let env = client(&http, &sleeper, Some("secret-token")).get_electricity_load("FR", 6);

    assert_eq!(http.calls(), 3);
    assert_eq!(sleeper.delays().len(), 2);
    let error = env.error.expect("error detail");
    assert_eq!(error.code, ErrorCode::TransportError);
    assert_eq!(error.http_status, Some(503));
}

#[test]
fn network_failure_is_retried_once() {
    let http = ScriptedHttp::new(vec![
        Err(NetworkError::new("connection reset")),
        Ok(RawResponse::new(200, LOAD_XML)),
    ]);
    let sleeper = RecordingSleeper::default();
    let env = client(&http, &sleeper, Some("secret-token")).get_electricity_load("FR", 6);

    assert!(env.is_success(), "{env}");
    assert_eq!(http.calls(), 2);
}

#[test]
fn unauthorized_is_not_retried() {
    let http = ScriptedHttp::repeat(401, 0, RawResponse::new(401, ""));
    let sleeper = RecordingSleeper::default();
    let env = client(&http, &sleeper, Some("revoked-token")).get_day_ahead_prices("FR", 1);

    assert_eq!(http.calls(), 1);
    assert!(sleeper.delays().is_empty());
    let error = env.error.expect("error detail");
    assert_eq!(error.code, ErrorCode::AuthenticationError);
    assert_eq!(error.http_status, Some(401));
}

#[test]
fn bad_request_carries_acknowledgement_reason() {
    let http = ScriptedHttp::new(vec![Ok(RawResponse::new(400, BAD_PARAM_ACK_XML))]);
    let sleeper = RecordingSleeper::default();
    let env = client(&http, &sleeper, Some("secret-token")).get_electricity_load("FR", 168);

    assert_eq!(http.calls(), 1);
    let error = env.error.expect("error detail");
    assert_eq!(error.code, ErrorCode::InvalidParameter);
    assert_eq!(error.http_status, Some(400));
    assert!(error.message.contains("exceeds allowed limit"));
}

#[test]
fn missing_token_never_calls_upstream() {
    let http = ScriptedHttp::new(vec![Ok(RawResponse::new(200, LOAD_XML))]);
    let sleeper = RecordingSleeper::default();

    for token in [None, Some("   ")] {
        let env = client(&http, &sleeper, token).get_electricity_load("FR", 6);
        assert_eq!(env.error.map(|e| e.code), Some(ErrorCode::AuthenticationError));
    }
    assert_eq!(http.calls(), 0);
}

#[test]
fn query_carries_token_and_period() {
    let http = ScriptedHttp::new(vec![Ok(RawResponse::new(200, LOAD_XML))]);
    let sleeper = RecordingSleeper::default();
    let env = client(&http, &sleeper, Some("secret-token")).get_electricity_load("FR", 6);

    assert!(env.is_success());
    assert_eq!(http.query_value(0, "securityToken").as_deref(), Some("secret-token"));
    assert_eq!(http.query_value(0, "documentType").as_deref(), Some("A65"));
    let start = http.query_value(0, "periodStart").unwrap_or_default();
    assert_eq!(start.len(), 12);
    assert!(start.ends_with("00"));
}

#[test]
fn diagnostics_reflect_the_transport_endpoint() {
    let http = ScriptedHttp::default();
    let sleeper = RecordingSleeper::default();
    let client = client(&http, &sleeper, Some("secret-token"));

    let info = client.api_info();
    assert!(info.token_configured);
    assert_eq!(info.base_url, DEFAULT_BASE_URL);

    let preview = client
        .preview_request("FR", DataType::Load, None)
        .unwrap();
    let url = &preview.requests[0].url;
    assert!(url.starts_with(DEFAULT_BASE_URL));
    assert!(url.contains("securityToken=secr****"), "{url}");
    assert!(!url.contains("secret-token"));
    assert_eq!(http.calls(), 0);
}

#[test]
fn unreachable_upstream_keeps_token_out_of_envelope() {
    let token = "SUPERSECRETTOKEN123";
    let transport = HttpTransport::new(
        ReqwestClient::new(Duration::from_secs(5)).unwrap(),
        ThreadSleeper,
        RetryPolicy::none(),
        "http://127.0.0.1:1/api",
        Some(token.to_string()),
    );
    let env = EntsoeClient::new(transport)
        .with_clock(fixed_clock())
        .get_electricity_load("FR", 6);

    let error = env.error.expect("error detail");
    assert_eq!(error.code, ErrorCode::TransportError);
    assert!(!error.message.contains(token), "{}", error.message);

    let json = serde_json::to_string(&error).unwrap();
    assert!(!json.contains(token));
}
