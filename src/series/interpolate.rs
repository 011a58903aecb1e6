/// Fill gaps by linear interpolation over row position
///
/// Interior gaps are drawn on a straight line between the neighbouring
/// observations. Leading and trailing gaps take the nearest observed value.
/// Row spacing in time is ignored. A column with no observations comes back
/// unchanged.
pub fn interpolate_linear(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    let (first, last) = match (known.first(), known.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return values.to_vec(),
    };

    let mut filled = values.to_vec();

    for slot in filled.iter_mut().take(first.0) {
        *slot = Some(first.1);
    }
    for slot in filled.iter_mut().skip(last.0 + 1) {
        *slot = Some(last.1);
    }

    for pair in known.windows(2) {
        let (start, start_value) = pair[0];
        let (end, end_value) = pair[1];
        let span = (end - start) as f64;

        for (i, slot) in filled.iter_mut().enumerate().take(end).skip(start + 1) {
            let frac = (i - start) as f64 / span;
            *slot = Some(start_value + (end_value - start_value) * frac);
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_gap_is_linear() {
        let values = vec![Some(10.0), None, None, Some(16.0)];
        let filled = interpolate_linear(&values);
        assert_eq!(filled, vec![Some(10.0), Some(12.0), Some(14.0), Some(16.0)]);
    }

    #[test]
    fn test_edges_held_flat() {
        let values = vec![None, None, Some(5.0), Some(7.0), None];
        let filled = interpolate_linear(&values);
        assert_eq!(
            filled,
            vec![Some(5.0), Some(5.0), Some(5.0), Some(7.0), Some(7.0)]
        );
    }

    #[test]
    fn test_all_missing_unchanged() {
        let values = vec![None, None];
        assert_eq!(interpolate_linear(&values), values);
    }

    #[test]
    fn test_empty() {
        assert!(interpolate_linear(&[]).is_empty());
    }
}
