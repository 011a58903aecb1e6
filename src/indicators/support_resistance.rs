use serde::Serialize;

use crate::models::{Analysis, ChartSeries};
use crate::series::PriceSeries;

/// Within 1% of support
const SUPPORT_TOLERANCE: f64 = 1.01;
/// Within 1% of resistance
const RESISTANCE_TOLERANCE: f64 = 0.99;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceZone {
    NearSupport,
    NearResistance,
    MidRange,
}

impl PriceZone {
    pub fn label(&self) -> &'static str {
        match self {
            PriceZone::NearSupport => "near support, possible bounce",
            PriceZone::NearResistance => "near resistance, possible pullback",
            PriceZone::MidRange => "mid-range, no clear signal",
        }
    }
}

/// Support is checked first, so a flat window reads as near support
pub fn classify_zone(current: f64, support: f64, resistance: f64) -> PriceZone {
    if current <= support * SUPPORT_TOLERANCE {
        PriceZone::NearSupport
    } else if current >= resistance * RESISTANCE_TOLERANCE {
        PriceZone::NearResistance
    } else {
        PriceZone::MidRange
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SupportResistanceReport {
    pub window: usize,
    pub support: f64,
    pub resistance: f64,
    pub current: f64,
    pub zone: PriceZone,
    pub charts: Vec<ChartSeries>,
}

/// Support/resistance band over the last `window` defined mid-prices
pub fn analyze_support_resistance(
    series: &PriceSeries,
    window: usize,
) -> Analysis<SupportResistanceReport> {
    let (timestamps, prices) = series.defined_mid_prices();
    let start = prices.len().saturating_sub(window);
    let recent = &prices[start..];
    let recent_ts = &timestamps[start..];

    let current = match recent.last() {
        Some(&p) => p,
        None => return Analysis::insufficient("no mid-price for support/resistance"),
    };
    let support = recent.iter().copied().fold(f64::INFINITY, f64::min);
    let resistance = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let zone = classify_zone(current, support, resistance);

    let as_options: Vec<Option<f64>> = recent.iter().copied().map(Some).collect();
    let charts = vec![
        ChartSeries::new("price", recent_ts, &as_options),
        ChartSeries::constant("support", recent_ts, support),
        ChartSeries::constant("resistance", recent_ts, resistance),
    ];

    Analysis::Ready(SupportResistanceReport {
        window,
        support,
        resistance,
        current,
        zone,
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
    fn test_near_resistance_scenario() {
        let report = analyze_support_resistance(&flat_series(&[10.0, 9.0, 11.0]), 3)
            .into_ready()
            .unwrap();
        assert_eq!(report.support, 9.0);
        assert_eq!(report.resistance, 11.0);
        assert_eq!(report.current, 11.0);
        assert_eq!(report.zone, PriceZone::NearResistance);
    }

    #[test]
    fn test_window_uses_tail_only() {
        let report = analyze_support_resistance(&flat_series(&[1.0, 50.0, 20.0, 30.0, 25.0]), 3)
            .into_ready()
            .unwrap();
        assert_eq!(report.support, 20.0);
        assert_eq!(report.resistance, 30.0);
        assert_eq!(report.zone, PriceZone::MidRange);
        assert_eq!(report.charts[0].len(), 3);
    }

    #[test]
    fn test_near_support() {
        let report = analyze_support_resistance(&flat_series(&[12.0, 15.0, 10.0]), 20)
            .into_ready()
            .unwrap();
        assert_eq!(report.zone, PriceZone::NearSupport);
        assert!(report.support <= report.resistance);
    }

    #[test]
    fn test_flat_window_prefers_support() {
        assert_eq!(classify_zone(5.0, 5.0, 5.0), PriceZone::NearSupport);
    }

    #[test]
    fn test_empty_is_insufficient() {
        assert!(!analyze_support_resistance(&PriceSeries::default(), 20).is_ready());
        assert!(!analyze_support_resistance(&flat_series(&[1.0]), 0).is_ready());
    }
}
