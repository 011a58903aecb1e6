use serde::Serialize;

use crate::indicators::{
    analyze_bollinger_bands, analyze_moving_averages, analyze_support_resistance, analyze_trend,
    BollingerReport, IndicatorConfig, MovingAverageReport, SupportResistanceReport, TrendReport,
};
use crate::models::{Analysis, ChartSeries};
use crate::series::PriceSeries;

/// Bid and ask lines for the price history chart
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceHistory {
    pub ask: ChartSeries,
    pub bid: ChartSeries,
    pub latest_bid: f64,
    pub latest_ask: Option<f64>,
    pub first_timestamp: i64,
    pub last_timestamp: i64,
}

/// Rows with a positive bid, as bid/ask lines
pub fn price_history(series: &PriceSeries) -> Analysis<PriceHistory> {
    let rows: Vec<_> = series
        .rows()
        .iter()
        .filter(|r| r.bid.is_some_and(|b| b > 0.0))
        .collect();

    let (first, last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Analysis::insufficient("every bid is zero or missing, nothing to chart"),
    };

    let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
    let asks: Vec<Option<f64>> = rows.iter().map(|r| r.ask).collect();
    let bids: Vec<Option<f64>> = rows.iter().map(|r| r.bid).collect();

    Analysis::Ready(PriceHistory {
        ask: ChartSeries::new("ask", &timestamps, &asks),
        bid: ChartSeries::new("bid", &timestamps, &bids),
        latest_bid: last.bid.unwrap_or_default(),
        latest_ask: last.ask,
        first_timestamp: first.timestamp,
        last_timestamp: last.timestamp,
    })
}

/// Everything the single-item page shows
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemReport {
    pub item_id: String,
    pub display_name: String,
    pub rows: usize,
    pub history: Analysis<PriceHistory>,
    pub trend: Analysis<TrendReport>,
    pub moving_averages: Analysis<MovingAverageReport>,
    pub support_resistance: Analysis<SupportResistanceReport>,
    pub bollinger: Analysis<BollingerReport>,
}

pub fn analyze_item(
    item_id: &str,
    display_name: &str,
    series: &PriceSeries,
    config: &IndicatorConfig,
) -> ItemReport {
    ItemReport {
        item_id: item_id.to_string(),
        display_name: display_name.to_string(),
        rows: series.len(),
        history: price_history(series),
        trend: analyze_trend(series, config.trend_smoothing_window),
        moving_averages: analyze_moving_averages(
            series,
            config.short_ma_window,
            config.long_ma_window,
        ),
        support_resistance: analyze_support_resistance(series, config.support_resistance_window),
        bollinger: analyze_bollinger_bands(
            series,
            config.bollinger_window,
            config.bollinger_num_std,
            config.bollinger_std_kind,
        ),
    }
}
