//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use entsoe_grid::client::EntsoeClient;
use entsoe_grid::clock::FixedClock;
use entsoe_grid::error::EntsoeError;
use entsoe_grid::request::RequestParams;
use entsoe_grid::transport::http::{HttpClient, HttpRequest, NetworkError, RawResponse};
use entsoe_grid::transport::retry::Sleeper;

/// Actual total load for France, three hourly points (100, 200, 300 MW).
pub const LOAD_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
  <mRID>load-doc</mRID>
  <type>A65</type>
  <TimeSeries>
    <mRID>1</mRID>
    <businessType>A04</businessType>
    <outBiddingZone_Domain.mRID codingScheme="A01">10YFR-RTE------C</outBiddingZone_Domain.mRID>
    <quantity_Measure_Unit.name>MAW</quantity_Measure_Unit.name>
    <curveType>A01</curveType>
    <Period>
      <timeInterval>
        <start>2024-03-10T08:00Z</start>
        <end>2024-03-10T11:00Z</end>
      </timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><quantity>100</quantity></Point>
      <Point><position>2</position><quantity>200</quantity></Point>
      <Point><position>3</position><quantity>300</quantity></Point>
    </Period>
  </TimeSeries>
</GL_MarketDocument>"#;

/// Quarter-hourly day-ahead prices with position 3 missing.
pub const PRICES_GAP_XML: &str = r#"<Publication_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:3">
  <mRID>prices-doc</mRID>
  <TimeSeries>
    <mRID>1</mRID>
    <businessType>A62</businessType>
    <currency_Unit.name>EUR</currency_Unit.name>
    <price_Measure_Unit.name>MWH</price_Measure_Unit.name>
    <curveType>A03</curveType>
    <Period>
      <timeInterval>
        <start>2024-03-09T00:00Z</start>
        <end>2024-03-09T01:00Z</end>
      </timeInterval>
      <resolution>PT15M</resolution>
      <Point><position>1</position><price.amount>40.5</price.amount></Point>
      <Point><position>2</position><price.amount>42.5</price.amount></Point>
      <Point><position>4</position><price.amount>45.5</price.amount></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#;

/// Physical flows, two hourly points (500 and 700 MW).
pub const FLOWS_XML: &str = r#"<Publication_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:3">
  <mRID>flows-doc</mRID>
  <TimeSeries>
    <mRID>1</mRID>
    <businessType>A66</businessType>
    <in_Domain.mRID codingScheme="A01">10YFR-RTE------C</in_Domain.mRID>
    <out_Domain.mRID codingScheme="A01">10Y1001A1001A83F</out_Domain.mRID>
    <quantity_Measure_Unit.name>MAW</quantity_Measure_Unit.name>
    <Period>
      <timeInterval>
        <start>2024-03-10T12:00Z</start>
        <end>2024-03-10T14:00Z</end>
      </timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><quantity>500</quantity></Point>
      <Point><position>2</position><quantity>700</quantity></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#;

/// Acknowledgement returned when nothing matches the query.
pub const NO_DATA_ACK_XML: &str = r#"<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
  <mRID>ack</mRID>
  <Reason>
    <code>999</code>
    <text>No matching data found</text>
  </Reason>
</Acknowledgement_MarketDocument>"#;

/// Acknowledgement carried by a 400 response.
pub const BAD_PARAM_ACK_XML: &str = r#"<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
  <Reason>
    <code>999</code>
    <text>The amount of requested data exceeds allowed limit</text>
  </Reason>
</Acknowledgement_MarketDocument>"#;

/// A well-formed namespace with a series that never closes.
pub const TRUNCATED_XML: &str = r#"<GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
  <TimeSeries>
    <Period>
      <timeInterval><start>2024-03-10T08:00Z</start>"#;

pub type StubFn = fn(&RequestParams) -> Result<String, EntsoeError>;

/// 2024-03-10 14:37 UTC, a Sunday afternoon.
pub fn fixed_clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 14, 37, 0).unwrap())
}

/// Client over a plain function transport with the fixed clock.
pub fn stub_client(transport: StubFn) -> EntsoeClient<StubFn> {
    EntsoeClient::new(transport).with_clock(fixed_clock())
}

/// Records requested backoff delays instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for &RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Replays scripted responses in order and records every query sent.
#[derive(Debug, Default)]
pub struct ScriptedHttp {
    replies: Mutex<VecDeque<Result<RawResponse, NetworkError>>>,
    pub queries: Mutex<Vec<Vec<(&'static str, String)>>>,
}

impl ScriptedHttp {
    pub fn new(replies: Vec<Result<RawResponse, NetworkError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Responds with `status` `count` times, then with `final_reply`.
    pub fn repeat(status: u16, count: usize, final_reply: RawResponse) -> Self {
        let mut replies: Vec<_> = (0..count).map(|_| Ok(RawResponse::new(status, ""))).collect();
        replies.push(Ok(final_reply));
        Self::new(replies)
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Value of `key` in the `n`-th recorded query.
    pub fn query_value(&self, n: usize, key: &str) -> Option<String> {
        self.queries.lock().unwrap().get(n).and_then(|q| {
            q.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        })
    }
}

impl HttpClient for &ScriptedHttp {
    fn get(&self, request: &HttpRequest<'_>) -> Result<RawResponse, NetworkError> {
        self.queries.lock().unwrap().push(request.query.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(NetworkError::new("script exhausted")))
    }
}
