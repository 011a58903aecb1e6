use serde::Serialize;

use super::rolling::{rolling_mean, rolling_std, StdDevKind};
use crate::models::{Analysis, ChartSeries};
use crate::series::PriceSeries;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BollingerZone {
    Overbought,
    Oversold,
    Normal,
}

impl BollingerZone {
    pub fn label(&self) -> &'static str {
        match self {
            BollingerZone::Overbought => "above upper band, possibly overbought (pullback risk)",
            BollingerZone::Oversold => "below lower band, possibly oversold (rebound possible)",
            BollingerZone::Normal => "inside the bands, normal range",
        }
    }
}

pub fn classify_bollinger(price: f64, upper: f64, lower: f64) -> BollingerZone {
    if price > upper {
        BollingerZone::Overbought
    } else if price < lower {
        BollingerZone::Oversold
    } else {
        BollingerZone::Normal
    }
}

/// Rolling middle/upper/lower lines, aligned with the input
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: Vec<Option<f64>>,
    pub std_dev: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn bollinger_bands(
    prices: &[Option<f64>],
    window: usize,
    num_std: f64,
    kind: StdDevKind,
) -> BollingerBands {
    let middle = rolling_mean(prices, window);
    let std_dev = rolling_std(prices, window, kind);

    let band = |sign: f64| -> Vec<Option<f64>> {
        middle
            .iter()
            .zip(&std_dev)
            .map(|(m, s)| Some((*m)? + sign * num_std * (*s)?))
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    BollingerBands {
        middle,
        std_dev,
        upper,
        lower,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BollingerReport {
    pub window: usize,
    pub num_std: f64,
    pub timestamp: i64,
    pub price: f64,
    pub middle: f64,
    pub std_dev: f64,
    pub upper: f64,
    pub lower: f64,
    pub zone: BollingerZone,
    pub charts: Vec<ChartSeries>,
}

/// Bollinger band position of the latest fully defined row
pub fn analyze_bollinger_bands(
    series: &PriceSeries,
    window: usize,
    num_std: f64,
    kind: StdDevKind,
) -> Analysis<BollingerReport> {
    let prices = series.mid_prices();
    let timestamps = series.timestamps();
    let bands = bollinger_bands(&prices, window, num_std, kind);

    let latest = (0..prices.len()).rev().find_map(|i| {
        Some((
            i,
            prices[i]?,
            bands.middle[i]?,
            bands.std_dev[i]?,
            bands.upper[i]?,
            bands.lower[i]?,
        ))
    });

    let (i, price, middle, std_dev, upper, lower) = match latest {
        Some(row) => row,
        None => {
            return Analysis::insufficient(format!(
                "need at least {} consecutive mid-prices for Bollinger bands",
                window
            ))
        }
    };

    let zone = classify_bollinger(price, upper, lower);
    tracing::debug!(
        "Bollinger({}, {}) price={:.4} band=[{:.4}, {:.4}] -> {:?}",
        window,
        num_std,
        price,
        lower,
        upper,
        zone
    );

    let charts = vec![
        ChartSeries::new("price", &timestamps, &prices),
        ChartSeries::new("middle", &timestamps, &bands.middle),
        ChartSeries::new("upper", &timestamps, &bands.upper),
        ChartSeries::new("lower", &timestamps, &bands.lower),
    ];

    Analysis::Ready(BollingerReport {
        window,
        num_std,
        timestamp: timestamps[i],
        price,
        middle,
        std_dev,
        upper,
        lower,
        zone,
        charts,
    })
}
