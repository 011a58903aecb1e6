use serde::Serialize;

/// Pivot threshold relative to the largest diagonal entry
const RANK_TOLERANCE: f64 = 1e-10;

/// Ordinary least-squares linear model with intercept
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Fit `target ~ features` where `features` holds one row per observation
    ///
    /// Works on centred data through the normal equations. A feature that is
    /// constant, or a linear combination of earlier features, gets a zero
    /// coefficient instead of failing the fit.
    ///
    /// Returns `None` for no rows or mismatched lengths.
    pub fn fit(features: &[Vec<f64>], target: &[f64]) -> Option<Self> {
        let n = features.len();
        if n == 0 || n != target.len() {
            return None;
        }
        let p = features[0].len();
        if features.iter().any(|row| row.len() != p) {
            return None;
        }

        let x_mean: Vec<f64> = (0..p)
            .map(|j| features.iter().map(|row| row[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = target.iter().sum::<f64>() / n as f64;

        // X'X and X'y on centred data
        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (row, y) in features.iter().zip(target) {
            let dy = y - y_mean;
            for i in 0..p {
                let di = row[i] - x_mean[i];
                xty[i] += di * dy;
                for j in i..p {
                    xtx[i][j] += di * (row[j] - x_mean[j]);
                }
            }
        }
        for i in 0..p {
            for j in 0..i {
                xtx[i][j] = xtx[j][i];
            }
        }

        let coefficients = solve_normal_equations(xtx, xty);
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(b, m)| b * m)
                .sum::<f64>();

        Some(Self {
            coefficients,
            intercept,
        })
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Coefficient of determination on the given data
    ///
    /// `None` when the target has no variance.
    pub fn r_squared(&self, features: &[Vec<f64>], target: &[f64]) -> Option<f64> {
        if target.is_empty() {
            return None;
        }
        let y_mean = target.iter().sum::<f64>() / target.len() as f64;
        let ss_tot: f64 = target.iter().map(|y| (y - y_mean).powi(2)).sum();
        if ss_tot == 0.0 {
            return None;
        }
        let ss_res: f64 = features
            .iter()
            .zip(target)
            .map(|(row, y)| (y - self.predict_one(row)).powi(2))
            .sum();
        Some(1.0 - ss_res / ss_tot)
    }
}

/// Gaussian elimination with partial pivoting
///
/// Columns whose best pivot falls under the tolerance are left free and
/// solved as zero.
fn solve_normal_equations(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let mut x = vec![0.0; n];
    if scale == 0.0 {
        return x;
    }
    let tol = scale * RANK_TOLERANCE;

    let mut pivots = Vec::with_capacity(n);
    let mut row = 0;
    for col in 0..n {
        if row == n {
            break;
        }

        let mut best = row;
        for r in (row + 1)..n {
            if a[r][col].abs() > a[best][col].abs() {
                best = r;
            }
        }
        if a[best][col].abs() <= tol {
            continue;
        }

        a.swap(row, best);
        b.swap(row, best);

        for r in (row + 1)..n {
            let factor = a[r][col] / a[row][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[r][c] -= factor * a[row][c];
            }
            b[r] -= factor * b[row];
        }

        pivots.push((row, col));
        row += 1;
    }

    for &(r, c) in pivots.iter().rev() {
        let mut sum = b[r];
        for k in (c + 1)..n {
            sum -= a[r][k] * x[k];
        }
        x[c] = sum / a[r][c];
    }

    x
}
