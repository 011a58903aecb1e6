// Raw price access
// SQLite snapshot reader plus the download that fetches it

pub mod download;
pub mod sqlite;

pub use download::{download_db_if_needed, DEFAULT_DB_URL};
pub use sqlite::MarketDb;

use crate::models::PriceRow;
use crate::Result;

/// Anything that can hand out raw bid/ask history for an item
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    /// Rows for the last `n_days`, ascending by time, zeros not yet cleaned
    async fn get_price_data(&self, item_id: &str, n_days: u32) -> Result<Vec<PriceRow>>;
}

impl PriceSource for MarketDb {
    async fn get_price_data(&self, item_id: &str, n_days: u32) -> Result<Vec<PriceRow>> {
        self.fetch_price_rows(item_id, n_days).await
    }
}
