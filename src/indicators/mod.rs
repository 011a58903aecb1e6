// Technical indicators module
// Trend slope, MA crossover, support/resistance and Bollinger bands on mid-price

pub mod bollinger;
pub mod moving_average;
pub mod rolling;
pub mod support_resistance;
pub mod trend;

pub use bollinger::{
    analyze_bollinger_bands, bollinger_bands, classify_bollinger, BollingerReport, BollingerZone,
};
pub use moving_average::{
    analyze_moving_averages, classify_crossover, CrossoverSignal,
    MovingAverageReport,
};
pub use rolling::{mean, rolling_mean, rolling_std, std_dev, StdDevKind};
pub use support_resistance::{
    analyze_support_resistance, classify_zone, PriceZone, SupportResistanceReport,
};
pub use trend::{analyze_trend, fit_line, TrendReport};

use serde::{Deserialize, Serialize};

/// Window sizes and band width for the per-item indicators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndicatorConfig {
    pub trend_smoothing_window: usize,
    pub short_ma_window: usize,
    pub long_ma_window: usize,
    pub support_resistance_window: usize,
    pub bollinger_window: usize,
    pub bollinger_num_std: f64,
    pub bollinger_std_kind: StdDevKind,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            trend_smoothing_window: 5,
            short_ma_window: 5,
            long_ma_window: 20,
            support_resistance_window: 20,
            bollinger_window: 20,
            bollinger_num_std: 2.0,
            bollinger_std_kind: StdDevKind::Sample,
        }
    }
}
