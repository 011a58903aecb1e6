use serde::Serialize;

use super::rolling::rolling_mean;
use crate::models::{Analysis, ChartSeries};
use crate::series::PriceSeries;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendReport {
    /// Price change per row
    pub slope: f64,
    pub intercept: f64,
    pub latest_price: f64,
    pub samples: usize,
    pub smoothed: ChartSeries,
}

/// Least-squares line through `y` against row index `0..n`
///
/// Returns `(slope, intercept)`. A single point has slope 0.
pub fn fit_line(y: &[f64]) -> Option<(f64, f64)> {
    let n = y.len();
    if n == 0 {
        return None;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut denom = 0.0;
    for (i, value) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (value - y_mean);
        denom += dx * dx;
    }

    let slope = if denom > 0.0 { num / denom } else { 0.0 };
    Some((slope, y_mean - slope * x_mean))
}

/// Trend of mid-price over the rows where both bid and ask exist
///
/// The fit runs against row index, not timestamp, so uneven sampling
/// does not bend the line.
pub fn analyze_trend(series: &PriceSeries, smoothing_window: usize) -> Analysis<TrendReport> {
    let (timestamps, prices) = series.defined_mid_prices();

    let (slope, intercept) = match fit_line(&prices) {
        Some(fit) => fit,
        None => return Analysis::insufficient("no rows with both bid and ask"),
    };
    let latest_price = prices[prices.len() - 1];

    let as_options: Vec<Option<f64>> = prices.iter().copied().map(Some).collect();
    let smoothed = ChartSeries::new(
        format!("rolling mean({})", smoothing_window),
        &timestamps,
        &rolling_mean(&as_options, smoothing_window),
    );

    Analysis::Ready(TrendReport {
        slope,
        intercept,
        latest_price,
        samples: prices.len(),
        smoothed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRow;

    #[test]
    fn test_trend_scenario() {
        let series = PriceSeries::from_rows(vec![
            PriceRow::new(0, Some(10.0), Some(12.0)),
            PriceRow::new(1, Some(11.0), Some(13.0)),
            PriceRow::new(2, Some(12.0), Some(14.0)),
        ]);
        let report = analyze_trend(&series, 5).into_ready().unwrap();
        assert_eq!(report.slope, 1.0);
        assert_eq!(report.intercept, 11.0);
        assert_eq!(format!("{:.2}", report.latest_price), "13.00");
        assert_eq!(report.samples, 3);
        // Window of 5 never fills on 3 rows
        assert_eq!(report.smoothed.last_value(), None);
    }

    #[test]
    fn test_rows_with_missing_side_dropped() {
        let series = PriceSeries::from_rows(vec![
            PriceRow::new(0, Some(10.0), Some(10.0)),
            PriceRow::new(1, None, Some(50.0)),
            PriceRow::new(2, Some(8.0), Some(8.0)),
        ]);
        let report = analyze_trend(&series, 2).into_ready().unwrap();
        assert_eq!(report.samples, 2);
        assert_eq!(report.slope, -2.0);
        assert_eq!(report.smoothed.last_value(), Some(9.0));
    }

    #[test]
    fn test_single_row_flat() {
        assert_eq!(fit_line(&[7.0]), Some((0.0, 7.0)));
    }

    #[test]
    fn test_empty_is_insufficient() {
        let series = PriceSeries::from_rows(vec![PriceRow::new(0, None, None)]);
        assert!(!analyze_trend(&series, 5).is_ready());
        assert!(fit_line(&[]).is_none());
    }
}
