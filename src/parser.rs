//! Streaming decoder for upstream time-series XML.
//!
//! Documents look like
//!
//! ```text
//! <*_MarketDocument xmlns="...">
//!   <TimeSeries>
//!     <businessType>A04</businessType>
//!     <quantity_Measure_Unit.name>MAW</quantity_Measure_Unit.name>
//!     <Period>
//!       <timeInterval><start>..</start><end>..</end></timeInterval>
//!       <resolution>PT15M</resolution>
//!       <Point><position>1</position><quantity>123</quantity></Point>
//!     </Period>
//!   </TimeSeries>
//! </*_MarketDocument>
//! ```
//!
//! Element names are matched on their local part, so any namespace prefix
//! is accepted.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::envelope::{DataPoint, Gap};
use crate::error::EntsoeError;

const DEFAULT_QUANTITY_UNIT: &str = "MW";
const DEFAULT_CURRENCY: &str = "EUR";
const DEFAULT_PRICE_UNIT: &str = "MWH";

/// Points and gaps decoded from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSeries {
    /// Ordered by timestamp, positions dense from zero.
    pub points: Vec<DataPoint>,
    pub gaps: Vec<Gap>,
}

impl ParsedSeries {
    /// Flips the sign of every value.
    pub fn negate(&mut self) {
        for p in &mut self.points {
            p.value = -p.value;
        }
    }
}

/// Decodes a time-series document.
///
/// # Errors
///
/// - [`EntsoeError::NoData`] for an acknowledgement document, carrying its reason
/// - [`EntsoeError::Malformed`] for anything that is not a well-formed,
///   namespaced market document with complete periods and points
pub fn parse(xml: &str) -> Result<ParsedSeries, EntsoeError> {
    match read_document(xml)? {
        Document::Series(series) => Ok(series),
        Document::Acknowledgement(reason) => Err(EntsoeError::NoData(reason)),
    }
}

/// Reason text of an acknowledgement document, if `body` is one.
pub fn acknowledgement_reason(body: &str) -> Option<String> {
    match read_document(body) {
        Ok(Document::Acknowledgement(reason)) => Some(reason),
        _ => None,
    }
}

/// Parses an ISO-8601 duration limited to days, hours, minutes and seconds.
///
/// # Errors
///
/// Returns [`EntsoeError::Malformed`] for years, months, weeks, zero or
/// unparseable durations.
pub fn parse_resolution(text: &str) -> Result<TimeDelta, EntsoeError> {
    let bad = || EntsoeError::Malformed(format!("unsupported resolution `{text}`"));
    let rest = text.trim().strip_prefix('P').ok_or_else(bad)?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut total = TimeDelta::zero();
    let mut accumulate = |part: &str, units: &[(char, i64)]| -> Result<(), EntsoeError> {
        let mut digits = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let seconds = units
                .iter()
                .find(|(u, _)| *u == c)
                .map(|(_, s)| *s)
                .ok_or_else(bad)?;
            let n: i64 = digits.parse().map_err(|_| bad())?;
            total = n
                .checked_mul(seconds)
                .and_then(TimeDelta::try_seconds)
                .and_then(|delta| total.checked_add(&delta))
                .ok_or_else(bad)?;
            digits.clear();
        }
        if digits.is_empty() { Ok(()) } else { Err(bad()) }
    };
    accumulate(date_part, &[('D', 86_400)])?;
    if let Some(t) = time_part {
        if t.is_empty() {
            return Err(bad());
        }
        accumulate(t, &[('H', 3_600), ('M', 60), ('S', 1)])?;
    }

    if total <= TimeDelta::zero() {
        return Err(bad());
    }
    Ok(total)
}

/// Parses `2024-01-01T00:00Z` or any RFC 3339 instant.
///
/// # Errors
///
/// Returns [`EntsoeError::Malformed`] when neither layout matches.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, EntsoeError> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%MZ")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| EntsoeError::Malformed(format!("invalid timestamp `{text}`")))
}

enum Document {
    Series(ParsedSeries),
    Acknowledgement(String),
}

#[derive(Default)]
struct RawPoint {
    position: Option<String>,
    quantity: Option<String>,
    price: Option<String>,
}

#[derive(Default)]
struct RawPeriod {
    start: Option<String>,
    end: Option<String>,
    resolution: Option<String>,
    points: Vec<RawPoint>,
}

struct RawSeries {
    index: usize,
    metadata: BTreeMap<String, String>,
    periods: Vec<RawPeriod>,
}

impl RawSeries {
    fn id(&self) -> String {
        self.metadata
            .get("series_id")
            .cloned()
            .unwrap_or_else(|| format!("#{}", self.index))
    }

    fn quantity_unit(&self) -> String {
        self.metadata
            .get("quantity_unit")
            .map_or(DEFAULT_QUANTITY_UNIT, String::as_str)
            .to_string()
    }

    fn price_unit(&self) -> String {
        let currency = self
            .metadata
            .get("currency")
            .map_or(DEFAULT_CURRENCY, String::as_str);
        let unit = self
            .metadata
            .get("price_unit")
            .map_or(DEFAULT_PRICE_UNIT, String::as_str);
        format!("{currency}/{unit}")
    }
}

#[derive(Default)]
struct DocumentState {
    root_seen: bool,
    acknowledgement: bool,
    reason_code: Option<String>,
    reason_text: Option<String>,
    series_count: usize,
    series: Option<RawSeries>,
    period: Option<RawPeriod>,
    point: Option<RawPoint>,
    out: ParsedSeries,
}

/// Series-level elements copied into point metadata, with their keys.
fn metadata_key(element: &str) -> Option<&'static str> {
    Some(match element {
        "mRID" => "series_id",
        "businessType" => "business_type",
        "objectAggregation" => "object_aggregation",
        "psrType" => "psr_type",
        "in_Domain.mRID" => "in_domain",
        "out_Domain.mRID" => "out_domain",
        "inBiddingZone_Domain.mRID" => "in_bidding_zone",
        "outBiddingZone_Domain.mRID" => "out_bidding_zone",
        "area_Domain.mRID" => "area_domain",
        "controlArea_Domain.mRID" => "control_area",
        "curveType" => "curve_type",
        "auction.type" => "auction_type",
        "contract_MarketAgreement.type" => "contract_type",
        "quantity_Measure_Unit.name" => "quantity_unit",
        "currency_Unit.name" => "currency",
        "price_Measure_Unit.name" => "price_unit",
        _ => return None,
    })
}

impl DocumentState {
    fn open(&mut self, name: &str, element: &BytesStart<'_>, depth: usize) -> Result<(), EntsoeError> {
        if depth == 0 {
            return self.open_root(name, element);
        }
        match name {
            "TimeSeries" => {
                self.series_count += 1;
                self.series = Some(RawSeries {
                    index: self.series_count,
                    metadata: BTreeMap::new(),
                    periods: Vec::new(),
                });
            }
            "Period" if self.series.is_some() => self.period = Some(RawPeriod::default()),
            "Point" if self.period.is_some() => self.point = Some(RawPoint::default()),
            _ => {}
        }
        Ok(())
    }

    fn open_root(&mut self, name: &str, element: &BytesStart<'_>) -> Result<(), EntsoeError> {
        if self.root_seen {
            return Err(EntsoeError::Malformed("multiple root elements".into()));
        }
        self.root_seen = true;
        if name == "Acknowledgement_MarketDocument" {
            self.acknowledgement = true;
            return Ok(());
        }
        if !name.ends_with("_MarketDocument") {
            return Err(EntsoeError::Malformed(format!(
                "unexpected root element `{name}`"
            )));
        }
        let namespaced = element
            .attributes()
            .flatten()
            .any(|a| a.key.as_ref() == b"xmlns" || a.key.as_ref().starts_with(b"xmlns:"));
        if !namespaced {
            return Err(EntsoeError::Malformed(format!(
                "root element `{name}` has no namespace"
            )));
        }
        Ok(())
    }

    fn text(&mut self, path: &[String], text: &str) {
        let Some((leaf, ancestors)) = path.split_last() else {
            return;
        };
        let parent = ancestors.last().map(String::as_str);
        let value = Some(text.to_string());

        if self.acknowledgement {
            if parent == Some("Reason") {
                match leaf.as_str() {
                    "code" => self.reason_code = value,
                    "text" => self.reason_text = value,
                    _ => {}
                }
            }
            return;
        }

        if let Some(point) = self.point.as_mut() {
            match leaf.as_str() {
                "position" => point.position = value,
                "quantity" => point.quantity = value,
                "price.amount" | "imbalance_Price.amount" => point.price = value,
                _ => {}
            }
            return;
        }

        if let Some(period) = self.period.as_mut() {
            match (parent, leaf.as_str()) {
                (Some("timeInterval"), "start") => period.start = value,
                (Some("timeInterval"), "end") => period.end = value,
                (Some("Period"), "resolution") => period.resolution = value,
                _ => {}
            }
            return;
        }

        if let Some(series) = self.series.as_mut() {
            if matches!(parent, Some("TimeSeries" | "MktPSRType")) {
                if let Some(key) = metadata_key(leaf) {
                    series.metadata.insert(key.to_string(), text.to_string());
                }
            }
        }
    }

    fn close(&mut self, name: &str) -> Result<(), EntsoeError> {
        match name {
            "Point" => {
                if let (Some(point), Some(period)) = (self.point.take(), self.period.as_mut()) {
                    period.points.push(point);
                }
            }
            "Period" => {
                if let (Some(period), Some(series)) = (self.period.take(), self.series.as_mut()) {
                    series.periods.push(period);
                }
            }
            "TimeSeries" => {
                if let Some(series) = self.series.take() {
                    self.finish_series(series)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_series(&mut self, series: RawSeries) -> Result<(), EntsoeError> {
        let id = series.id();
        if series.periods.is_empty() {
            return Err(EntsoeError::Malformed(format!(
                "TimeSeries {id} has no Period"
            )));
        }
        for period in &series.periods {
            self.decode_period(&series, &id, period)?;
        }
        Ok(())
    }

    fn decode_period(
        &mut self,
        series: &RawSeries,
        id: &str,
        period: &RawPeriod,
    ) -> Result<(), EntsoeError> {
        let start = period
            .start
            .as_deref()
            .ok_or_else(|| EntsoeError::Malformed(format!("Period in {id} lacks timeInterval/start")))
            .and_then(parse_instant)?;
        let raw_resolution = period
            .resolution
            .as_deref()
            .ok_or_else(|| EntsoeError::Malformed(format!("Period in {id} lacks resolution")))?;
        let resolution = parse_resolution(raw_resolution)?;
        let end = period.end.as_deref().map(parse_instant).transpose()?;

        let mut metadata = series.metadata.clone();
        metadata.insert("resolution".to_string(), raw_resolution.trim().to_string());

        let mut present = BTreeSet::new();
        for raw in &period.points {
            let position = raw
                .position
                .as_deref()
                .and_then(|p| p.trim().parse::<i64>().ok())
                .filter(|p| *p >= 1)
                .ok_or_else(|| {
                    EntsoeError::Malformed(format!(
                        "Point in {id} has invalid position {:?}",
                        raw.position
                    ))
                })?;
            let (text, unit) = match (&raw.quantity, &raw.price) {
                (Some(q), _) => (q, series.quantity_unit()),
                (None, Some(p)) => (p, series.price_unit()),
                (None, None) => {
                    return Err(EntsoeError::Malformed(format!(
                        "Point {position} in {id} has no quantity or price"
                    )));
                }
            };
            let value: f64 = text.trim().parse().map_err(|_| {
                EntsoeError::Malformed(format!("Point {position} in {id} has non-numeric value `{text}`"))
            })?;
            present.insert(position);
            self.out.points.push(DataPoint {
                timestamp: offset(start, resolution, position - 1)?,
                value,
                unit,
                position: 0,
                metadata: metadata.clone(),
            });
        }

        let expected = end.map_or(0, |end| {
            ((end - start).num_seconds() / resolution.num_seconds()).max(0)
        });
        let last = present.last().copied().unwrap_or(0).max(expected);
        let mut next = 1;
        for position in present.iter().copied().chain(std::iter::once(last + 1)) {
            if position > next {
                self.out.gaps.push(Gap {
                    series: id.to_string(),
                    start: offset(start, resolution, next - 1)?,
                    end: offset(start, resolution, position - 1)?,
                    missing_points: usize::try_from(position - next).map_err(|_| {
                        EntsoeError::Malformed(format!("Period in {id} spans too many positions"))
                    })?,
                });
            }
            next = position + 1;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Document, EntsoeError> {
        if !self.root_seen {
            return Err(EntsoeError::Malformed("empty document".into()));
        }
        if self.acknowledgement {
            let reason = match (self.reason_code, self.reason_text) {
                (Some(code), Some(text)) => format!("{code}: {text}"),
                (None, Some(text)) => text,
                (Some(code), None) => code,
                (None, None) => "acknowledgement without reason".to_string(),
            };
            return Ok(Document::Acknowledgement(reason));
        }
        self.out.points.sort_by_key(|p| p.timestamp);
        for (i, p) in self.out.points.iter_mut().enumerate() {
            p.position = i;
        }
        debug!(
            series = self.series_count,
            points = self.out.points.len(),
            gaps = self.out.gaps.len(),
            "decoded document"
        );
        Ok(Document::Series(self.out))
    }
}

fn offset(start: DateTime<Utc>, resolution: TimeDelta, steps: i64) -> Result<DateTime<Utc>, EntsoeError> {
    i32::try_from(steps)
        .ok()
        .and_then(|steps| resolution.checked_mul(steps))
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| EntsoeError::Malformed(format!("position {} out of range", steps + 1)))
}

fn local_name(element: &BytesStart<'_>) -> Result<String, EntsoeError> {
    std::str::from_utf8(element.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| EntsoeError::Malformed(format!("invalid element name: {e}")))
}

fn read_document(xml: &str) -> Result<Document, EntsoeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut state = DocumentState::default();
    let mut path: Vec<String> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                state.open(&name, &e, path.len())?;
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e)?;
                state.open(&name, &e, path.len())?;
                state.close(&name)?;
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| EntsoeError::Malformed(format!("invalid text: {e}")))?;
                state.text(&path, &text);
            }
            Ok(Event::End(_)) => {
                if let Some(name) = path.pop() {
                    state.close(&name)?;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(EntsoeError::Malformed(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }
    if !path.is_empty() {
        return Err(EntsoeError::Malformed("unexpected end of document".into()));
    }
    state.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0";

    fn doc(series: &str) -> String {
        format!(r#"<GL_MarketDocument xmlns="{NS}"><mRID>doc</mRID>{series}</GL_MarketDocument>"#)
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn quarter_hour_points_are_spaced_by_resolution() {
        let points: String = (1..=8)
            .map(|i| format!("<Point><position>{i}</position><quantity>{}</quantity></Point>", i * 10))
            .collect();
        let xml = doc(&format!(
            "<TimeSeries><mRID>1</mRID><businessType>A04</businessType>\
             <outBiddingZone_Domain.mRID>10Y1001A1001A83F</outBiddingZone_Domain.mRID>\
             <quantity_Measure_Unit.name>MAW</quantity_Measure_Unit.name>\
             <Period><timeInterval><start>2024-01-01T00:00Z</start><end>2024-01-01T02:00Z</end></timeInterval>\
             <resolution>PT15M</resolution>{points}</Period></TimeSeries>"
        ));
        let parsed = parse(&xml).unwrap();
        assert_eq!(parsed.points.len(), 8);
        assert!(parsed.gaps.is_empty());
        for (k, p) in parsed.points.iter().enumerate() {
            assert_eq!(p.timestamp, at(0, 0) + TimeDelta::minutes(15 * k as i64));
            assert_eq!(p.position, k);
            assert_eq!(p.unit, "MAW");
            assert_eq!(p.metadata["business_type"], "A04");
            assert_eq!(p.metadata["resolution"], "PT15M");
            assert_eq!(p.metadata["out_bidding_zone"], "10Y1001A1001A83F");
        }
    }

    #[test]
    fn missing_positions_become_gaps() {
        let xml = doc(
            "<TimeSeries><Period><timeInterval><start>2024-01-01T00:00Z</start><end>2024-01-01T06:00Z</end></timeInterval>\
             <resolution>PT60M</resolution>\
             <Point><position>2</position><quantity>1</quantity></Point>\
             <Point><position>5</position><quantity>2</quantity></Point>\
             </Period></TimeSeries>",
        );
        let parsed = parse(&xml).unwrap();
        assert_eq!(parsed.points.len(), 2);
        let gaps: Vec<(DateTime<Utc>, DateTime<Utc>, usize)> = parsed
            .gaps
            .iter()
            .map(|g| (g.start, g.end, g.missing_points))
            .collect();
        assert_eq!(
            gaps,
            vec![
                (at(0, 0), at(1, 0), 1),
                (at(2, 0), at(4, 0), 2),
                (at(5, 0), at(6, 0), 1),
            ]
        );
        assert_eq!(parsed.gaps[0].series, "#1");
    }

    #[test]
    fn series_are_merged_in_time_order() {
        let series = |start: &str, value: u32| {
            format!(
                "<TimeSeries><Period><timeInterval><start>{start}</start></timeInterval>\
                 <resolution>PT1H</resolution><Point><position>1</position><quantity>{value}</quantity></Point>\
                 <Point><position>2</position><quantity>{value}</quantity></Point></Period></TimeSeries>"
            )
        };
        let xml = doc(&format!(
            "{}{}",
            series("2024-01-01T02:00Z", 2),
            series("2024-01-01T00:00Z", 1)
        ));
        let parsed = parse(&xml).unwrap();
        let stamps: Vec<_> = parsed.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![at(0, 0), at(1, 0), at(2, 0), at(3, 0)]);
        let positions: Vec<_> = parsed.points.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn prices_use_currency_per_unit() {
        let xml = r#"<Publication_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:3">
  <TimeSeries>
    <currency_Unit.name>EUR</currency_Unit.name>
    <price_Measure_Unit.name>MWH</price_Measure_Unit.name>
    <curveType>A03</curveType>
    <Period>
      <timeInterval><start>2024-01-01T23:00Z</start><end>2024-01-02T01:00Z</end></timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>85.12</price.amount></Point>
      <Point><position>2</position><price.amount>-3.5</price.amount></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#;
        let parsed = parse(xml).unwrap();
        assert_eq!(parsed.points[0].unit, "EUR/MWH");
        assert_eq!(parsed.points[1].value, -3.5);
        assert_eq!(parsed.points[0].metadata["curve_type"], "A03");
    }

    #[test]
    fn series_without_period_is_malformed() {
        let xml = doc("<TimeSeries><mRID>7</mRID><businessType>A04</businessType></TimeSeries>");
        assert_eq!(
            parse(&xml),
            Err(EntsoeError::Malformed("TimeSeries 7 has no Period".into()))
        );
    }

    #[test]
    fn period_without_resolution_is_malformed() {
        let xml = doc(
            "<TimeSeries><Period><timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
             <Point><position>1</position><quantity>1</quantity></Point></Period></TimeSeries>",
        );
        assert!(matches!(parse(&xml), Err(EntsoeError::Malformed(_))));
    }

    #[test]
    fn bad_positions_are_malformed() {
        for position in ["0", "-1", "x", ""] {
            let xml = doc(&format!(
                "<TimeSeries><Period><timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
                 <resolution>PT60M</resolution><Point><position>{position}</position><quantity>1</quantity></Point>\
                 </Period></TimeSeries>"
            ));
            assert!(matches!(parse(&xml), Err(EntsoeError::Malformed(_))), "{position}");
        }
    }

    #[test]
    fn acknowledgement_is_no_data() {
        let xml = r#"<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
  <mRID>ack</mRID>
  <Reason><code>999</code><text>No matching data found for Data item ACTUAL_TOTAL_LOAD</text></Reason>
</Acknowledgement_MarketDocument>"#;
        assert_eq!(
            parse(xml),
            Err(EntsoeError::NoData(
                "999: No matching data found for Data item ACTUAL_TOTAL_LOAD".into()
            ))
        );
        assert!(acknowledgement_reason(xml).is_some());
        assert_eq!(acknowledgement_reason("<html>oops</html>"), None);
    }

    #[test]
    fn foreign_roots_are_rejected() {
        assert!(matches!(parse("<html><body/></html>"), Err(EntsoeError::Malformed(_))));
        assert!(matches!(
            parse("<GL_MarketDocument><TimeSeries/></GL_MarketDocument>"),
            Err(EntsoeError::Malformed(_))
        ));
        assert!(matches!(parse(""), Err(EntsoeError::Malformed(_))));
        assert!(matches!(
            parse(&format!(r#"<GL_MarketDocument xmlns="{NS}"><TimeSeries>"#)),
            Err(EntsoeError::Malformed(_))
        ));
    }

    #[test]
    fn document_without_series_is_empty() {
        let parsed = parse(&doc("")).unwrap();
        assert!(parsed.points.is_empty());
    }

    #[test]
    fn resolutions() {
        assert_eq!(parse_resolution("PT15M"), Ok(TimeDelta::minutes(15)));
        assert_eq!(parse_resolution("PT60M"), Ok(TimeDelta::hours(1)));
        assert_eq!(parse_resolution("PT1H"), Ok(TimeDelta::hours(1)));
        assert_eq!(parse_resolution("P1D"), Ok(TimeDelta::days(1)));
        assert_eq!(parse_resolution("P1DT12H"), Ok(TimeDelta::hours(36)));
        for bad in ["P1Y", "PT", "15M", "PT0M", "P7W", "PTM"] {
            assert!(parse_resolution(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn oversized_resolutions_are_malformed() {
        for huge in [
            "P99999999999999999D",
            "PT9999999999999999S",
            "P106751991167300DT1H",
            "PT9223372036854775807S",
        ] {
            assert!(
                matches!(parse_resolution(huge), Err(EntsoeError::Malformed(_))),
                "{huge}"
            );
        }
        let xml = doc(
            "<TimeSeries><Period><timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
             <resolution>PT9999999999999999S</resolution>\
             <Point><position>1</position><quantity>1</quantity></Point></Period></TimeSeries>",
        );
        assert!(matches!(parse(&xml), Err(EntsoeError::Malformed(_))));
    }

    #[test]
    fn distant_period_end_yields_one_trailing_gap() {
        let period = |end: &str| {
            doc(&format!(
                "<TimeSeries><Period><timeInterval><start>2024-01-01T00:00Z</start><end>{end}</end></timeInterval>\
                 <resolution>PT1M</resolution>\
                 <Point><position>1</position><quantity>1</quantity></Point></Period></TimeSeries>"
            ))
        };

        let parsed = parse(&period("2124-01-01T00:00Z")).unwrap();
        let end = Utc.with_ymd_and_hms(2124, 1, 1, 0, 0, 0).unwrap();
        let minutes = (end - at(0, 0)).num_minutes() as usize;
        assert_eq!(parsed.points.len(), 1);
        assert_eq!(parsed.gaps.len(), 1);
        assert_eq!(parsed.gaps[0].start, at(0, 1));
        assert_eq!(parsed.gaps[0].end, end);
        assert_eq!(parsed.gaps[0].missing_points, minutes - 1);

        // Beyond the addressable position range.
        assert!(matches!(
            parse(&period("9999-12-31T23:59Z")),
            Err(EntsoeError::Malformed(_))
        ));
    }

    #[test]
    fn instants_accept_both_layouts() {
        assert_eq!(parse_instant("2024-01-01T05:00Z"), Ok(at(5, 0)));
        assert_eq!(parse_instant("2024-01-01T06:00:00+01:00"), Ok(at(5, 0)));
        assert!(parse_instant("yesterday").is_err());
    }
}
