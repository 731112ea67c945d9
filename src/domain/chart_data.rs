//! Chart series filtering.
//!
//! Price and return series come straight from the response and may carry
//! nulls, strings or missing fields (the service's rolling windows leave
//! gaps at the start). Records are checked one at a time; bad ones are
//! dropped and the rest keep their order.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnPoint {
    pub date: String,
    #[serde(rename = "return")]
    pub value: f64,
}

impl ReturnPoint {
    pub fn percent(&self) -> f64 {
        self.value * 100.0
    }
}

/// A record type that can be lifted out of one raw series entry.
pub trait ChartRecord: Sized {
    fn from_record(record: &Map<String, Value>) -> Option<Self>;
}

fn finite(record: &Map<String, Value>, key: &str) -> Option<f64> {
    match record.get(key)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn date(record: &Map<String, Value>) -> Option<String> {
    match record.get("date")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

impl ChartRecord for PricePoint {
    fn from_record(record: &Map<String, Value>) -> Option<Self> {
        Some(PricePoint {
            date: date(record)?,
            open: finite(record, "open")?,
            high: finite(record, "high")?,
            low: finite(record, "low")?,
            close: finite(record, "close")?,
        })
    }
}

impl ChartRecord for ReturnPoint {
    fn from_record(record: &Map<String, Value>) -> Option<Self> {
        Some(ReturnPoint {
            date: date(record)?,
            value: finite(record, "return")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    NotASequence,
    Empty,
    AllInvalid { dropped: usize },
}

/// Filtered points, or the reason there is nothing to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries<T> {
    Points(Vec<T>),
    NoData(NoDataReason),
}

impl<T> ChartSeries<T> {
    pub fn points(&self) -> Option<&[T]> {
        match self {
            ChartSeries::Points(points) => Some(points),
            ChartSeries::NoData(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.points().map_or(0, <[T]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keep the well-formed records of a series, in order.
pub fn filter_records<T: ChartRecord>(records: &[Value]) -> ChartSeries<T> {
    if records.is_empty() {
        return ChartSeries::NoData(NoDataReason::Empty);
    }

    let points: Vec<T> = records
        .iter()
        .filter_map(|r| r.as_object().and_then(T::from_record))
        .collect();

    if points.is_empty() {
        ChartSeries::NoData(NoDataReason::AllInvalid {
            dropped: records.len(),
        })
    } else {
        ChartSeries::Points(points)
    }
}

/// Like [`filter_records`] but starting from an arbitrary value.
pub fn filter_value<T: ChartRecord>(value: &Value) -> ChartSeries<T> {
    match value.as_array() {
        Some(records) => filter_records(records),
        None => ChartSeries::NoData(NoDataReason::NotASequence),
    }
}

pub fn price_points(records: &[Value]) -> ChartSeries<PricePoint> {
    filter_records(records)
}

pub fn return_points(records: &[Value]) -> ChartSeries<ReturnPoint> {
    filter_records(records)
}

/// Shorten ISO timestamps such as `2024-01-05T00:00:00` to `2024-01-05`.
///
/// Anything that does not start with a calendar date is returned as is.
pub fn date_label(date: &str) -> String {
    date.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| date.to_string())
}
