// Core modules
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod forecast;
pub mod indicators;
pub mod models;
pub mod names;
pub mod series;

// Re-export commonly used types
pub use error::MarketError;
pub use models::*;
pub use series::PriceSeries;

// Error handling
pub type Result<T> = std::result::Result<T, MarketError>;
