use serde::Serialize;

use super::rolling::rolling_mean;
use crate::models::{Analysis, ChartSeries, Signal};
use crate::series::PriceSeries;

/// Classification of the short/long moving-average pair
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverSignal {
    BullishCross,
    BearishCross,
    NoSignal,
}

impl CrossoverSignal {
    pub fn label(&self) -> &'static str {
        match self {
            CrossoverSignal::BullishCross => "bullish cross: short MA above long MA (buy)",
            CrossoverSignal::BearishCross => "bearish cross: short MA below long MA (sell)",
            CrossoverSignal::NoSignal => "no clear crossover signal yet",
        }
    }

    pub fn signal(&self) -> Signal {
        match self {
            CrossoverSignal::BullishCross => Signal::Buy,
            CrossoverSignal::BearishCross => Signal::Sell,
            CrossoverSignal::NoSignal => Signal::Hold,
        }
    }
}

/// Compare the two averages. Equal or NaN gives no signal.
pub fn classify_crossover(short_ma: f64, long_ma: f64) -> CrossoverSignal {
    if short_ma > long_ma {
        CrossoverSignal::BullishCross
    } else if short_ma < long_ma {
        CrossoverSignal::BearishCross
    } else {
        CrossoverSignal::NoSignal
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovingAverageReport {
    pub short_window: usize,
    pub long_window: usize,
    /// Row the signal was read from (latest row with both averages)
    pub timestamp: Option<i64>,
    pub price: Option<f64>,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub signal: CrossoverSignal,
    /// What the crossover suggests doing
    pub action: Signal,
    pub charts: Vec<ChartSeries>,
}

/// Moving-average crossover on mid-price
///
/// Only the most recent row where price and both averages are defined
/// decides the signal. Earlier crossovers are not reported.
pub fn analyze_moving_averages(
    series: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Analysis<MovingAverageReport> {
    let prices = series.mid_prices();
    if prices.iter().all(Option::is_none) {
        return Analysis::insufficient("no mid-price available for moving averages");
    }

    let timestamps = series.timestamps();
    let short = rolling_mean(&prices, short_window);
    let long = rolling_mean(&prices, long_window);

    let latest = (0..prices.len())
        .rev()
        .find_map(|i| match (prices[i], short[i], long[i]) {
            (Some(p), Some(s), Some(l)) => Some((timestamps[i], p, s, l)),
            _ => None,
        });

    let (timestamp, price, short_ma, long_ma, signal) = match latest {
        Some((t, p, s, l)) => (Some(t), Some(p), Some(s), Some(l), classify_crossover(s, l)),
        None => (None, None, None, None, CrossoverSignal::NoSignal),
    };

    tracing::debug!(
        "MA({}/{}) -> {:?} (short={:?}, long={:?})",
        short_window,
        long_window,
        signal,
        short_ma,
        long_ma
    );

    let charts = vec![
        ChartSeries::new("price", &timestamps, &prices),
        ChartSeries::new(format!("short MA({})", short_window), &timestamps, &short),
        ChartSeries::new(format!("long MA({})", long_window), &timestamps, &long),
    ];

    Analysis::Ready(MovingAverageReport {
        short_window,
        long_window,
        timestamp,
        price,
        short_ma,
        long_ma,
        signal,
        action: signal.signal(),
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRow;

    fn flat_series(prices: &[f64]) -> PriceSeries {
        PriceSeries::from_rows(
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| PriceRow::new(i as i64, Some(p), Some(p)))
                .collect(),
        )
    }

    #[test]
    fn test_bullish_cross_on_rising_prices() {
        let series = flat_series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let report = analyze_moving_averages(&series, 2, 3).into_ready().unwrap();
        assert_eq!(report.short_ma, Some(5.5));
        assert_eq!(report.long_ma, Some(5.0));
        assert_eq!(report.signal, CrossoverSignal::BullishCross);
        assert_eq!(report.action, Signal::Buy);
    }

    #[test]
    fn test_bearish_cross_on_falling_prices() {
        let series = flat_series(&[6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let report = analyze_moving_averages(&series, 2, 3).into_ready().unwrap();
        assert_eq!(report.signal, CrossoverSignal::BearishCross);
        assert_eq!(report.action, Signal::Sell);
    }

    #[test]
    fn test_only_latest_row_counts() {
        // Rising then flat: the early bullish cross is gone by the last row
        let series = flat_series(&[1.0, 2.0, 3.0, 5.0, 5.0, 5.0, 5.0]);
        let report = analyze_moving_averages(&series, 2, 3).into_ready().unwrap();
        assert_eq!(report.signal, CrossoverSignal::NoSignal);
    }

    #[test]
    fn test_too_short_for_long_window() {
        let series = flat_series(&[1.0, 2.0, 3.0]);
        let report = analyze_moving_averages(&series, 5, 20).into_ready().unwrap();
        assert_eq!(report.signal, CrossoverSignal::NoSignal);
        assert_eq!(report.action, Signal::Hold);
        assert_eq!(report.long_ma, None);
        assert_eq!(report.charts.len(), 3);
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let report = analyze_moving_averages(&PriceSeries::default(), 5, 20);
        assert!(!report.is_ready());
    }

    #[test]
    fn test_deterministic() {
        let series = flat_series(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let a = analyze_moving_averages(&series, 2, 4);
        let b = analyze_moving_averages(&series, 2, 4);
        assert_eq!(a, b);
    }
}
