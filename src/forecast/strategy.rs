/// Supplies the predictor values a fitted model is applied to when
/// projecting forward
///
/// Implementations must return exactly `days` rows when `history` is not
/// empty, each as wide as the history rows.
pub trait FuturePredictorStrategy: Send + Sync {
    /// Get strategy name
    fn name(&self) -> &str;

    /// Feature rows for the next `days` steps, given observed rows oldest first
    fn future_features(&self, history: &[Vec<f64>], days: usize) -> Vec<Vec<f64>>;
}

/// Reuse the most recent `days` observed predictor rows as next `days` inputs
///
/// This is an approximation, not a lagged forecast: it assumes predictor
/// prices stay where they were over the horizon. With fewer than `days`
/// rows observed, the last row is repeated to fill the horizon.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldRecentObservations;

impl FuturePredictorStrategy for HoldRecentObservations {
    fn name(&self) -> &str {
        "hold-recent-observations"
    }

    fn future_features(&self, history: &[Vec<f64>], days: usize) -> Vec<Vec<f64>> {
        let last = match history.last() {
            Some(row) => row,
            None => return Vec::new(),
        };

        let start = history.len().saturating_sub(days);
        let mut rows = history[start..].to_vec();
        while rows.len() < days {
            rows.push(last.clone());
        }
        rows
    }
}

/// Hold the latest observed predictor row flat for every step
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatLatest;

impl FuturePredictorStrategy for RepeatLatest {
    fn name(&self) -> &str {
        "repeat-latest"
    }

    fn future_features(&self, history: &[Vec<f64>], days: usize) -> Vec<Vec<f64>> {
        match history.last() {
            Some(row) => vec![row.clone(); days],
            None => Vec::new(),
        }
    }
}
