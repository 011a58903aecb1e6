// Correlation-based forecasting
// Joint price matrix -> correlation -> top-N predictors -> OLS -> projection

pub mod correlation;
pub mod matrix;
pub mod regression;
pub mod strategy;

pub use correlation::{pearson, select_predictors, CorrelationMatrix};
pub use matrix::MultiItemMatrix;
pub use regression::LinearModel;
pub use strategy::{FuturePredictorStrategy, HoldRecentObservations, RepeatLatest};

use serde::{Deserialize, Serialize};

use crate::models::{Analysis, ChartSeries};

/// Which [`FuturePredictorStrategy`] to project with
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastPolicy {
    #[default]
    HoldRecent,
    RepeatLatest,
}

impl ForecastPolicy {
    pub fn strategy(&self) -> Box<dyn FuturePredictorStrategy> {
        match self {
            ForecastPolicy::HoldRecent => Box::new(HoldRecentObservations),
            ForecastPolicy::RepeatLatest => Box::new(RepeatLatest),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of predictor items
    pub top_n: usize,
    /// Forecast horizon, in rows
    pub days: usize,
    pub policy: ForecastPolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            top_n: 2,
            days: 3,
            policy: ForecastPolicy::HoldRecent,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastResult {
    pub target: String,
    pub predictors: Vec<String>,
    /// Correlation of each predictor with the target, same order
    pub predictor_correlations: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub r_squared: Option<f64>,
    pub strategy: String,
    /// Last observed target values (at most `days`)
    pub history: Vec<f64>,
    /// Projected target values, exactly `days`
    pub predictions: Vec<f64>,
}

impl ForecastResult {
    /// History followed by predictions, indexed by step
    pub fn chart(&self) -> ChartSeries {
        let mut values = self.history.clone();
        values.extend_from_slice(&self.predictions);
        ChartSeries::from_values(format!("{} forecast", self.target), &values)
    }
}

/// Project `target` forward from its most correlated items
///
/// Fits OLS on every aligned row of `matrix`, then applies the model to the
/// feature rows produced by `strategy`.
pub fn forecast_by_correlation(
    matrix: &MultiItemMatrix,
    corr: &CorrelationMatrix,
    target: &str,
    config: &ForecastConfig,
    strategy: &dyn FuturePredictorStrategy,
) -> Analysis<ForecastResult> {
    let selected = match select_predictors(corr, target, config.top_n) {
        Analysis::Ready(selected) => selected,
        Analysis::InsufficientData(reason) => return Analysis::InsufficientData(reason),
    };
    let (predictors, predictor_correlations): (Vec<String>, Vec<f64>) =
        selected.into_iter().unzip();

    let y = match matrix.column(target) {
        Some(col) => col,
        None => return Analysis::insufficient(format!("no aligned prices for target {}", target)),
    };
    let predictor_cols: Vec<&[f64]> = predictors
        .iter()
        .filter_map(|p| matrix.column(p))
        .collect();
    if predictor_cols.len() != predictors.len() {
        return Analysis::insufficient("predictor missing from price matrix");
    }

    let features: Vec<Vec<f64>> = (0..matrix.n_rows())
        .map(|row| predictor_cols.iter().map(|col| col[row]).collect())
        .collect();

    let model = match LinearModel::fit(&features, y) {
        Some(model) => model,
        None => return Analysis::insufficient("no rows to fit the regression"),
    };

    let future = strategy.future_features(&features, config.days);
    let predictions = model.predict(&future);
    let history = y[y.len().saturating_sub(config.days)..].to_vec();
    let r_squared = model.r_squared(&features, y);

    tracing::info!(
        "Forecast {} from [{}] via {}: {:?}",
        target,
        predictors.join(", "),
        strategy.name(),
        predictions
    );

    Analysis::Ready(ForecastResult {
        target: target.to_string(),
        predictors,
        predictor_correlations,
        coefficients: model.coefficients,
        intercept: model.intercept,
        r_squared,
        strategy: strategy.name().to_string(),
        history,
        predictions,
    })
}
