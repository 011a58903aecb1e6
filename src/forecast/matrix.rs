use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::models::Analysis;
use crate::series::{interpolate_linear, PriceSeries};

/// Mid-prices of several items on one shared, gap-free timestamp index
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MultiItemMatrix {
    timestamps: Vec<i64>,
    items: Vec<String>,
    /// One column per item, same order as `items`
    columns: Vec<Vec<f64>>,
}

impl MultiItemMatrix {
    /// Join items on timestamp and fill what the join leaves open
    ///
    /// Steps: outer join of every item's mid-price on timestamp (ascending),
    /// per-column linear interpolation with flat edges, then drop any row
    /// that still has a gap. A gap can only survive in a column that had no
    /// mid-price at all, which empties the matrix.
    ///
    /// Repeated item ids are ignored after the first.
    pub fn build(series: &[(String, PriceSeries)]) -> Analysis<Self> {
        let mut items: Vec<String> = Vec::new();
        let mut lookups: Vec<HashMap<i64, f64>> = Vec::new();
        let mut all_timestamps = BTreeSet::new();

        for (item, s) in series {
            if items.contains(item) {
                tracing::warn!("Item {} listed twice, using first series", item);
                continue;
            }
            let mut prices = HashMap::with_capacity(s.len());
            for row in s.rows() {
                all_timestamps.insert(row.timestamp);
                if let Some(p) = row.mid_price() {
                    prices.insert(row.timestamp, p);
                }
            }
            items.push(item.clone());
            lookups.push(prices);
        }

        let joined_ts: Vec<i64> = all_timestamps.into_iter().collect();
        let filled: Vec<Vec<Option<f64>>> = lookups
            .iter()
            .map(|prices| {
                let raw: Vec<Option<f64>> =
                    joined_ts.iter().map(|t| prices.get(t).copied()).collect();
                interpolate_linear(&raw)
            })
            .collect();

        let mut timestamps = Vec::new();
        let mut columns = vec![Vec::new(); items.len()];
        for (row, &t) in joined_ts.iter().enumerate() {
            if filled.iter().any(|col| col[row].is_none()) {
                continue;
            }
            timestamps.push(t);
            for (col, values) in columns.iter_mut().zip(&filled) {
                col.extend(values[row]);
            }
        }

        if items.is_empty() || timestamps.is_empty() {
            return Analysis::insufficient("no aligned rows to build the price matrix");
        }

        tracing::debug!(
            "Built price matrix: {} items x {} rows",
            items.len(),
            timestamps.len()
        );

        Analysis::Ready(Self {
            timestamps,
            items,
            columns,
        })
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn n_rows(&self) -> usize {
        self.timestamps.len()
    }

    pub fn item_index(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    pub fn column(&self, item: &str) -> Option<&[f64]> {
        self.item_index(item).map(|i| self.columns[i].as_slice())
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRow;

    fn series(points: &[(i64, Option<f64>)]) -> PriceSeries {
        PriceSeries::from_rows(
            points
                .iter()
                .map(|&(t, p)| PriceRow::new(t, p, p))
                .collect(),
        )
    }

    #[test]
    fn test_outer_join_and_interpolate() {
        let input = vec![
            ("a".to_string(), series(&[(1, Some(1.0)), (3, Some(3.0))])),
            ("b".to_string(), series(&[(2, Some(20.0)), (3, Some(30.0))])),
        ];
        let m = MultiItemMatrix::build(&input).into_ready().unwrap();
        assert_eq!(m.timestamps(), &[1, 2, 3]);
        assert_eq!(m.column("a").unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(m.column("b").unwrap(), &[20.0, 20.0, 30.0]);
    }

    #[test]
    fn test_all_columns_share_index() {
        let input = vec![
            ("a".to_string(), series(&[(1, Some(1.0)), (5, None), (9, Some(3.0))])),
            ("b".to_string(), series(&[(4, Some(2.0))])),
            ("c".to_string(), series(&[(7, Some(5.0)), (8, Some(6.0))])),
        ];
        let m = MultiItemMatrix::build(&input).into_ready().unwrap();
        assert_eq!(m.n_rows(), 6);
        for col in m.columns() {
            assert_eq!(col.len(), m.n_rows());
        }
    }

    #[test]
    fn test_column_without_prices_empties_matrix() {
        let input = vec![
            ("a".to_string(), series(&[(1, Some(1.0))])),
            ("b".to_string(), series(&[(1, None)])),
        ];
        assert!(!MultiItemMatrix::build(&input).is_ready());
    }

    #[test]
    fn test_empty_input_is_insufficient() {
        assert!(!MultiItemMatrix::build(&[]).is_ready());
    }

    #[test]
    fn test_duplicate_item_ignored() {
        let input = vec![
            ("a".to_string(), series(&[(1, Some(1.0))])),
            ("a".to_string(), series(&[(1, Some(9.0))])),
        ];
        let m = MultiItemMatrix::build(&input).into_ready().unwrap();
        assert_eq!(m.items().len(), 1);
        assert_eq!(m.column("a").unwrap(), &[1.0]);
    }
}
