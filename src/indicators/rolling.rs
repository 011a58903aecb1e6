use serde::{Deserialize, Serialize};

/// Divisor used for the standard deviation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StdDevKind {
    /// n - 1
    #[default]
    Sample,
    /// n
    Population,
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation of a slice
///
/// A sample deviation needs at least two values.
pub fn std_dev(values: &[f64], kind: StdDevKind) -> Option<f64> {
    let ddof = match kind {
        StdDevKind::Sample => 1,
        StdDevKind::Population => 0,
    };
    if values.len() <= ddof {
        return None;
    }

    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - ddof) as f64;

    Some(variance.sqrt())
}

/// Rolling mean over `window` rows
///
/// The first `window - 1` rows and any window containing a gap are `None`.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, mean)
}

/// Rolling standard deviation over `window` rows, gaps handled like
/// [`rolling_mean`]
pub fn rolling_std(values: &[Option<f64>], window: usize, kind: StdDevKind) -> Vec<Option<f64>> {
    rolling(values, window, |w| std_dev(w, kind))
}

fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut buf = Vec::with_capacity(window);

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            buf.clear();
            for value in &values[i + 1 - window..=i] {
                buf.push((*value)?);
            }
            f(&buf)
        })
        .collect()
}
