use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::models::PriceRow;
use crate::{MarketError, Result};

/// Column holding the epoch-second timestamp in both price tables
const TIME_COLUMN: &str = "time";

/// The snapshot keeps one wide table per order side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Ask,
    Bid,
}

impl Side {
    fn table(&self) -> &'static str {
        match self {
            Side::Ask => "ask",
            Side::Bid => "bid",
        }
    }
}

/// Read-only access to the market price snapshot
///
/// Layout: tables `ask` and `bid`, each with a `time` column plus one REAL
/// column per item id.
pub struct MarketDb {
    pool: SqlitePool,
}

impl MarketDb {
    /// Open the snapshot file read-only
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        tracing::info!("Opened price snapshot at {}", path.display());

        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Item ids present in the snapshot (ask table columns, `time` excluded)
    pub async fn list_items(&self) -> Result<Vec<String>> {
        self.item_columns(Side::Ask).await
    }

    async fn item_columns(&self, side: Side) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM pragma_table_info(?) ORDER BY cid")
            .bind(side.table())
            .fetch_all(&self.pool)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            if name != TIME_COLUMN {
                columns.push(name);
            }
        }
        Ok(columns)
    }

    /// Bid/ask rows for `item_id` over the last `n_days`
    pub async fn fetch_price_rows(&self, item_id: &str, n_days: u32) -> Result<Vec<PriceRow>> {
        let cutoff = lookback_cutoff(Utc::now(), n_days)?;
        self.fetch_price_rows_since(item_id, cutoff).await
    }

    /// Bid/ask rows for `item_id` with `time >= cutoff`
    ///
    /// Ask and bid are outer-joined on time and sorted ascending. Values
    /// come back raw: zeros are not yet treated as missing.
    pub async fn fetch_price_rows_since(&self, item_id: &str, cutoff: i64) -> Result<Vec<PriceRow>> {
        let asks = self.load_side(Side::Ask, item_id, cutoff).await?;
        let bids = self.load_side(Side::Bid, item_id, cutoff).await?;

        let mut merged: BTreeMap<i64, PriceRow> = BTreeMap::new();
        for (time, ask) in asks {
            merged.entry(time).or_insert_with(|| PriceRow::new(time, None, None)).ask = ask;
        }
        for (time, bid) in bids {
            merged.entry(time).or_insert_with(|| PriceRow::new(time, None, None)).bid = bid;
        }

        tracing::debug!(
            "Loaded {} price rows for {} since {}",
            merged.len(),
            item_id,
            cutoff
        );

        Ok(merged.into_values().collect())
    }

    async fn load_side(&self, side: Side, item_id: &str, cutoff: i64) -> Result<Vec<(i64, Option<f64>)>> {
        // Item ids are column names and cannot be bound as parameters
        if !self.item_columns(side).await?.iter().any(|c| c == item_id) {
            return Err(MarketError::UnknownItem(item_id.to_string()));
        }

        let sql = format!(
            "SELECT CAST({time} AS INTEGER) AS time, CAST({item} AS REAL) AS price \
             FROM {table} WHERE {time} >= ? ORDER BY {time} ASC",
            time = TIME_COLUMN,
            item = quote_identifier(item_id),
            table = side.table(),
        );

        let rows = sqlx::query(&sql).bind(cutoff).fetch_all(&self.pool).await?;

        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let time: i64 = row.try_get("time")?;
            let price: Option<f64> = row.try_get("price")?;
            values.push((time, price));
        }
        Ok(values)
    }
}

/// Epoch seconds `n_days` before `now`; errors instead of overflowing
fn lookback_cutoff(now: DateTime<Utc>, n_days: u32) -> Result<i64> {
    TimeDelta::try_days(i64::from(n_days))
        .and_then(|span| now.checked_sub_signed(span))
        .map(|cutoff| cutoff.timestamp())
        .ok_or(MarketError::InvalidLookback(n_days))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> MarketDb {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        for table in ["ask", "bid"] {
            let sql = format!(
                "CREATE TABLE {} (time INTEGER, \"Iron Bar\" REAL, \"Milk\" REAL)",
                table
            );
            sqlx::query(&sql).execute(&pool).await.unwrap();
        }

        let asks = [(100, Some(12.0)), (200, Some(13.0)), (300, None)];
        for (time, price) in asks {
            sqlx::query("INSERT INTO ask (time, \"Iron Bar\", \"Milk\") VALUES (?, ?, 1.0)")
                .bind(time)
                .bind(price)
                .execute(&pool)
                .await
                .unwrap();
        }
        let bids = [(100, Some(10.0)), (250, Some(0.0))];
        for (time, price) in bids {
            sqlx::query("INSERT INTO bid (time, \"Iron Bar\", \"Milk\") VALUES (?, ?, 1.0)")
                .bind(time)
                .bind(price)
                .execute(&pool)
                .await
                .unwrap();
        }

        MarketDb::from_pool(pool)
    }

    #[tokio::test]
    async fn test_list_items() {
        let db = test_db().await;
        let items = db.list_items().await.unwrap();
        assert_eq!(items, vec!["Iron Bar".to_string(), "Milk".to_string()]);
    }

    #[tokio::test]
    async fn test_outer_join_on_time() {
        let db = test_db().await;
        let rows = db.fetch_price_rows_since("Iron Bar", 0).await.unwrap();
        let times: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(times, vec![100, 200, 250, 300]);
        assert_eq!(rows[0], PriceRow::new(100, Some(10.0), Some(12.0)));
        assert_eq!(rows[1], PriceRow::new(200, None, Some(13.0)));
        // zero comes back raw, cleaning happens in PriceSeries
        assert_eq!(rows[2], PriceRow::new(250, Some(0.0), None));
        assert_eq!(rows[3], PriceRow::new(300, None, None));
    }

    #[tokio::test]
    async fn test_cutoff_applied() {
        let db = test_db().await;
        let rows = db.fetch_price_rows_since("Iron Bar", 200).await.unwrap();
        assert_eq!(rows.first().map(|r| r.timestamp), Some(200));
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let db = test_db().await;
        let err = db.fetch_price_rows_since("Nope\"; DROP TABLE ask; --", 0).await;
        assert!(matches!(err, Err(MarketError::UnknownItem(_))));
        assert_eq!(db.list_items().await.unwrap().len(), 2);
    }

    #[test]
    fn test_lookback_cutoff() {
        let now = DateTime::from_timestamp(10 * 86_400, 0).unwrap();
        assert_eq!(lookback_cutoff(now, 7).unwrap(), 3 * 86_400);
    }

    #[tokio::test]
    async fn test_huge_lookback_is_an_error() {
        let db = test_db().await;
        let result = db.fetch_price_rows("Iron Bar", u32::MAX).await;
        assert!(matches!(result, Err(MarketError::InvalidLookback(u32::MAX))));
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("Iron Bar"), "\"Iron Bar\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
