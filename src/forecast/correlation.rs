use std::cmp::Ordering;

use serde::Serialize;

use super::matrix::MultiItemMatrix;
use crate::models::Analysis;

/// Pearson correlation coefficient of two equally long series
///
/// `NaN` when undefined: fewer than two points or a constant series.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let x_mean = x[..n].iter().sum::<f64>() / n as f64;
    let y_mean = y[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut x_var = 0.0;
    let mut y_var = 0.0;
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - x_mean;
        let dy = b - y_mean;
        cov += dx * dy;
        x_var += dx * dx;
        y_var += dy * dy;
    }

    if x_var == 0.0 || y_var == 0.0 {
        return f64::NAN;
    }

    (cov / (x_var * y_var).sqrt()).clamp(-1.0, 1.0)
}

/// Pairwise Pearson correlation of every matrix column
///
/// Symmetric, diagonal 1.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorrelationMatrix {
    items: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn from_matrix(matrix: &MultiItemMatrix) -> Self {
        let columns = matrix.columns();
        let n = columns.len();
        let mut values = vec![vec![1.0; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let r = pearson(&columns[i], &columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            items: matrix.items().to_vec(),
            values,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Rows of the matrix, same order as `items`
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.items.iter().position(|x| x == a)?;
        let j = self.items.iter().position(|x| x == b)?;
        Some(self.values[i][j])
    }
}

/// Strongest absolute correlation first, `NaN` last
fn by_abs_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.abs().partial_cmp(&a.abs()).unwrap_or(Ordering::Equal),
    }
}

/// Pick the `top_n` items most correlated with `target`
///
/// Ranked by absolute correlation, descending. The sort is stable so
/// column order breaks ties. Returns `(item, correlation)` pairs.
pub fn select_predictors(
    corr: &CorrelationMatrix,
    target: &str,
    top_n: usize,
) -> Analysis<Vec<(String, f64)>> {
    let target_idx = match corr.items.iter().position(|x| x == target) {
        Some(i) => i,
        None => return Analysis::insufficient(format!("no aligned prices for target {}", target)),
    };

    let mut candidates: Vec<(String, f64)> = corr
        .items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target_idx)
        .map(|(i, item)| (item.clone(), corr.values[target_idx][i]))
        .collect();

    candidates.sort_by(|a, b| by_abs_desc(a.1, b.1));
    candidates.truncate(top_n);

    if candidates.is_empty() {
        return Analysis::insufficient(format!("no predictor available for {}", target));
    }

    Analysis::Ready(candidates)
}
