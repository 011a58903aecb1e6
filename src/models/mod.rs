use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bid/ask observation for one item at one point in time
///
/// Either side may be missing. Missing is never the same as zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceRow {
    pub timestamp: i64, // epoch seconds
    pub bid: Option<f64>,
    pub ask: Option<f64>,
}

impl PriceRow {
    pub fn new(timestamp: i64, bid: Option<f64>, ask: Option<f64>) -> Self {
        Self { timestamp, bid, ask }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Average of bid and ask, undefined if either side is missing
    pub fn mid_price(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// One point of a chart line. `y` is `None` where the line has a gap.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ChartPoint {
    pub x: i64,
    pub y: Option<f64>,
}

/// A labelled line handed to the charting front end
///
/// `x` is an epoch timestamp for price charts and a step index for the
/// forecast chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, xs: &[i64], ys: &[Option<f64>]) -> Self {
        let points = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| ChartPoint { x, y })
            .collect();
        Self {
            label: label.into(),
            points,
        }
    }

    /// Series indexed by position (0, 1, 2, ...)
    pub fn from_values(label: impl Into<String>, ys: &[f64]) -> Self {
        let points = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| ChartPoint {
                x: i as i64,
                y: Some(y),
            })
            .collect();
        Self {
            label: label.into(),
            points,
        }
    }

    /// Horizontal line at `value` across `xs`
    pub fn constant(label: impl Into<String>, xs: &[i64], value: f64) -> Self {
        let ys = vec![Some(value); xs.len()];
        Self::new(label, xs, &ys)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent defined value
    pub fn last_value(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.y)
    }
}

/// Result of an analysis that can run short of data
///
/// Running short of data is expected: an empty lookback window or an item
/// that only just started trading. It is reported, not raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Analysis<T> {
    Ready(T),
    InsufficientData(String),
}

impl<T> Analysis<T> {
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Analysis::InsufficientData(reason.into())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Analysis::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Analysis::Ready(value) => Some(value),
            Analysis::InsufficientData(_) => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Analysis::Ready(value) => Some(value),
            Analysis::InsufficientData(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Analysis::Ready(_) => None,
            Analysis::InsufficientData(reason) => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Analysis<U> {
        match self {
            Analysis::Ready(value) => Analysis::Ready(f(value)),
            Analysis::InsufficientData(reason) => Analysis::InsufficientData(reason),
        }
    }
}
