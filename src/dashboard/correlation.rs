use serde::Serialize;

use crate::forecast::{
    forecast_by_correlation, CorrelationMatrix, ForecastConfig, ForecastResult, MultiItemMatrix,
};
use crate::models::Analysis;
use crate::series::PriceSeries;

/// Minimum number of loaded items for the correlation page
pub const MIN_CORRELATION_ITEMS: usize = 2;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorrelationReport {
    pub items: Vec<String>,
    pub aligned_rows: usize,
    pub correlation: CorrelationMatrix,
    pub target: String,
    pub forecast: Analysis<ForecastResult>,
}

/// Correlation heatmap data plus a forecast for `target`
pub fn correlate_series(
    loaded: &[(String, PriceSeries)],
    target: &str,
    config: &ForecastConfig,
) -> Analysis<CorrelationReport> {
    if loaded.len() < MIN_CORRELATION_ITEMS {
        return Analysis::insufficient(format!(
            "need at least {} items with data for correlation, have {}",
            MIN_CORRELATION_ITEMS,
            loaded.len()
        ));
    }

    let matrix = match MultiItemMatrix::build(loaded) {
        Analysis::Ready(matrix) => matrix,
        Analysis::InsufficientData(reason) => return Analysis::InsufficientData(reason),
    };
    let correlation = CorrelationMatrix::from_matrix(&matrix);

    let strategy = config.policy.strategy();
    let forecast = forecast_by_correlation(&matrix, &correlation, target, config, strategy.as_ref());

    Analysis::Ready(CorrelationReport {
        items: matrix.items().to_vec(),
        aligned_rows: matrix.n_rows(),
        correlation,
        target: target.to_string(),
        forecast,
    })
}
