// Price series preprocessing
// Turns raw snapshot rows into a sorted, gap-filled series

pub mod interpolate;

pub use interpolate::interpolate_linear;

use crate::models::PriceRow;
use serde::Serialize;

/// Time-ordered bid/ask history for one item
///
/// Timestamps are ascending and unique.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PriceSeries {
    rows: Vec<PriceRow>,
}

impl PriceSeries {
    /// Sort rows by timestamp and drop duplicate timestamps (first one wins)
    ///
    /// Values are taken as-is, see [`PriceSeries::preprocess`] for cleaning.
    pub fn from_rows(mut rows: Vec<PriceRow>) -> Self {
        rows.sort_by_key(|r| r.timestamp);
        rows.dedup_by_key(|r| r.timestamp);
        Self { rows }
    }

    /// Build a series ready for analysis
    ///
    /// 1. Zero and non-finite bid/ask values become missing. The snapshot
    ///    writes 0 where an item had no order on that side, so a zero is a
    ///    gap marker for this market, never a real price.
    /// 2. Bid and ask are each filled with [`interpolate_linear`].
    pub fn preprocess(rows: Vec<PriceRow>) -> Self {
        let mut series = Self::from_rows(rows);

        let bids: Vec<Option<f64>> = series.rows.iter().map(|r| clean(r.bid)).collect();
        let asks: Vec<Option<f64>> = series.rows.iter().map(|r| clean(r.ask)).collect();

        let bids = interpolate_linear(&bids);
        let asks = interpolate_linear(&asks);

        for ((row, bid), ask) in series.rows.iter_mut().zip(bids).zip(asks) {
            row.bid = bid;
            row.ask = ask;
        }

        series
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    /// Mid-price per row, `None` where bid or ask is missing
    pub fn mid_prices(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(PriceRow::mid_price).collect()
    }

    /// Timestamps and mid-prices of the rows where both sides are present
    pub fn defined_mid_prices(&self) -> (Vec<i64>, Vec<f64>) {
        self.rows
            .iter()
            .filter_map(|r| r.mid_price().map(|p| (r.timestamp, p)))
            .unzip()
    }

    pub fn latest_mid_price(&self) -> Option<f64> {
        self.rows.iter().rev().find_map(PriceRow::mid_price)
    }
}

fn clean(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}
