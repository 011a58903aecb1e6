use thiserror::Error;

/// Upstream failures: the snapshot, the config store or the network
/// could not be read or written.
///
/// Not having enough rows to compute an indicator is not an error, see
/// [`crate::models::Analysis`].
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unknown item `{0}` (no such column in the price snapshot)")]
    UnknownItem(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("settings error: {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error("invalid lookback of {0} days (expected 1..=90)")]
    InvalidLookback(u32),
}
