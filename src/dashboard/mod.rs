// Per-page analysis for the presentation layer
//
// Every monitored item is loaded and analyzed on its own. A failed load is
// collected next to the successful reports and never stops the batch.

pub mod correlation;
pub mod item;

pub use correlation::{correlate_series, CorrelationReport, MIN_CORRELATION_ITEMS};
pub use item::{analyze_item, price_history, ItemReport, PriceHistory};

use serde::Serialize;

use crate::db::PriceSource;
use crate::forecast::ForecastConfig;
use crate::indicators::IndicatorConfig;
use crate::models::Analysis;
use crate::names::NameMap;
use crate::series::PriceSeries;
use crate::Result;

/// An item whose data could not be loaded
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemFailure {
    pub item_id: String,
    pub display_name: String,
    pub error: String,
}

/// Reports for the items that loaded, failures for the rest
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Batch<T> {
    pub reports: Vec<T>,
    pub failures: Vec<ItemFailure>,
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            reports: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Fetch and preprocess one item
pub async fn load_series<S: PriceSource>(source: &S, item_id: &str, n_days: u32) -> Result<PriceSeries> {
    let rows = source.get_price_data(item_id, n_days).await?;
    Ok(PriceSeries::preprocess(rows))
}

/// Load every item independently, in order
pub async fn collect_series<S: PriceSource>(
    source: &S,
    items: &[String],
    n_days: u32,
) -> Vec<(String, Result<PriceSeries>)> {
    let mut results = Vec::with_capacity(items.len());

    for item_id in items {
        let result = load_series(source, item_id, n_days).await;
        match &result {
            Ok(series) => tracing::info!("  ✓ {} ({} rows)", item_id, series.len()),
            Err(e) => tracing::warn!("  ✗ {} failed to load: {}", item_id, e),
        }
        results.push((item_id.clone(), result));
    }

    results
}

fn split_loaded(
    results: Vec<(String, Result<PriceSeries>)>,
    names: &NameMap,
) -> (Vec<(String, PriceSeries)>, Vec<ItemFailure>) {
    let mut loaded = Vec::new();
    let mut failures = Vec::new();

    for (item_id, result) in results {
        match result {
            Ok(series) => loaded.push((item_id, series)),
            Err(e) => failures.push(ItemFailure {
                display_name: names.display_name(&item_id).to_string(),
                item_id,
                error: e.to_string(),
            }),
        }
    }

    (loaded, failures)
}

/// Single-item page: every indicator for each item
pub async fn analyze_items<S: PriceSource>(
    source: &S,
    items: &[String],
    names: &NameMap,
    n_days: u32,
    config: &IndicatorConfig,
) -> Batch<ItemReport> {
    let (loaded, failures) = split_loaded(collect_series(source, items, n_days).await, names);

    let reports = loaded
        .iter()
        .map(|(item_id, series)| analyze_item(item_id, names.display_name(item_id), series, config))
        .collect();

    Batch { reports, failures }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverviewEntry {
    pub item_id: String,
    pub display_name: String,
    pub history: Analysis<PriceHistory>,
}

/// Overview page: bid/ask history of every item
pub async fn overview<S: PriceSource>(
    source: &S,
    items: &[String],
    names: &NameMap,
    n_days: u32,
) -> Batch<OverviewEntry> {
    let (loaded, failures) = split_loaded(collect_series(source, items, n_days).await, names);

    let reports = loaded
        .iter()
        .map(|(item_id, series)| OverviewEntry {
            item_id: item_id.clone(),
            display_name: names.display_name(item_id).to_string(),
            history: price_history(series),
        })
        .collect();

    Batch { reports, failures }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorrelationPage {
    pub report: Analysis<CorrelationReport>,
    pub failures: Vec<ItemFailure>,
}

/// Correlation page: matrix over every loaded item plus a forecast
///
/// `target` defaults to the first monitored item.
pub async fn correlate<S: PriceSource>(
    source: &S,
    items: &[String],
    names: &NameMap,
    n_days: u32,
    target: Option<&str>,
    config: &ForecastConfig,
) -> CorrelationPage {
    let (loaded, failures) = split_loaded(collect_series(source, items, n_days).await, names);

    let report = match target.or_else(|| items.first().map(String::as_str)) {
        Some(target) => correlate_series(&loaded, target, config),
        None => Analysis::insufficient("no items monitored"),
    };

    CorrelationPage { report, failures }
}
