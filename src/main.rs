use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mwimarket::config::{ConfigStore, MonitorConfig, Settings, MAX_LOOKBACK_DAYS};
use mwimarket::dashboard::{
    self, Batch, CorrelationPage, ItemFailure, ItemReport, OverviewEntry,
};
use mwimarket::db::{download_db_if_needed, MarketDb};
use mwimarket::names::NameMap;
use mwimarket::Analysis;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mwimarket", version, about = "Market price analysis for monitored items")]
struct Cli {
    /// Settings file (default: ./mwimarket.toml when present)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Print results as JSON, chart series included
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the price snapshot if it is not there yet
    Download {
        /// Download even if the file exists
        #[arg(long)]
        force: bool,
    },
    /// Manage the monitored item list
    Items {
        #[command(subcommand)]
        action: ItemsAction,
    },
    /// Set the lookback window in days
    Lookback {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_LOOKBACK_DAYS as i64))]
        days: u32,
    },
    /// Indicator report for each monitored item
    Analyze {
        /// Only this item (id or display name)
        #[arg(long)]
        item: Option<String>,
    },
    /// Bid/ask history for every monitored item
    Overview,
    /// Correlation matrix and correlation-based forecast
    Correlate {
        /// Item to forecast (id or display name), default: first monitored
        #[arg(long)]
        target: Option<String>,
        /// Number of predictor items
        #[arg(long)]
        top_n: Option<usize>,
        /// Forecast horizon
        #[arg(long)]
        days: Option<usize>,
    },
}

#[derive(Subcommand)]
enum ItemsAction {
    /// Show monitored items
    List,
    /// Start monitoring an item (id or display name)
    Add { name: String },
    /// Stop monitoring an item (id or display name)
    Remove { name: String },
    /// Remove every monitored item
    Clear,
    /// List item ids present in the snapshot
    Available,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let settings = Settings::load(cli.settings.as_deref()).context("Failed to load settings")?;
    let store = ConfigStore::new(&settings.monitor_config_path);
    let names = load_name_map(&settings.name_map_path);

    match cli.command {
        Command::Download { force } => {
            let downloaded =
                download_db_if_needed(&settings.database.url, &settings.database.path, force)
                    .await
                    .context("Snapshot download failed")?;
            if !downloaded {
                println!(
                    "Snapshot already present at {}",
                    settings.database.path.display()
                );
            }
        }
        Command::Items { action } => run_items(action, &store, &names, &settings, cli.json).await?,
        Command::Lookback { days } => {
            let (config, _) = store.update(|c| c.set_lookback(days))?;
            println!("📅 Lookback set to {} days", config.n_days);
        }
        Command::Analyze { item } => {
            let config = store.load().context("Failed to read monitor config")?;
            let items = match item {
                Some(name) => vec![names.resolve_item_id(&name)],
                None => config.items.clone(),
            };
            if items.is_empty() {
                print_no_items();
                return Ok(());
            }

            let db = open_db(&settings).await?;
            tracing::info!("🔍 Analyzing {} items over {} days", items.len(), config.n_days);
            let batch =
                dashboard::analyze_items(&db, &items, &names, config.n_days, &settings.indicators)
                    .await;

            if cli.json {
                print_json(&batch)?;
            } else {
                print_item_batch(&batch, config.n_days);
            }
        }
        Command::Overview => {
            let config = store.load().context("Failed to read monitor config")?;
            if config.items.is_empty() {
                print_no_items();
                return Ok(());
            }

            let db = open_db(&settings).await?;
            let batch = dashboard::overview(&db, &config.items, &names, config.n_days).await;

            if cli.json {
                print_json(&batch)?;
            } else {
                print_overview(&batch);
            }
        }
        Command::Correlate {
            target,
            top_n,
            days,
        } => {
            let config = store.load().context("Failed to read monitor config")?;
            if config.items.is_empty() {
                print_no_items();
                return Ok(());
            }

            let mut forecast = settings.forecast.clone();
            if let Some(top_n) = top_n {
                forecast.top_n = top_n;
            }
            if let Some(days) = days {
                forecast.days = days;
            }
            let target = target.map(|t| names.resolve_item_id(&t));

            let db = open_db(&settings).await?;
            let page = dashboard::correlate(
                &db,
                &config.items,
                &names,
                config.n_days,
                target.as_deref(),
                &forecast,
            )
            .await;

            if cli.json {
                print_json(&page)?;
            } else {
                print_correlation(&page, &names);
            }
        }
    }

    Ok(())
}

// ============================================================================
// Initialization Functions
// ============================================================================

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mwimarket=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_name_map(path: &Path) -> NameMap {
    match NameMap::load(path) {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(
                "Failed to load name map from {} ({}), showing raw item ids",
                path.display(),
                e
            );
            NameMap::default()
        }
    }
}

async fn open_db(settings: &Settings) -> Result<MarketDb> {
    download_db_if_needed(&settings.database.url, &settings.database.path, false)
        .await
        .context("Snapshot download failed")?;
    MarketDb::open(&settings.database.path)
        .await
        .with_context(|| format!("Failed to open {}", settings.database.path.display()))
}

// ============================================================================
// Monitored Items
// ============================================================================

async fn run_items(
    action: ItemsAction,
    store: &ConfigStore,
    names: &NameMap,
    settings: &Settings,
    json: bool,
) -> Result<()> {
    match action {
        ItemsAction::List => {
            let config = store.load()?;
            if json {
                print_json(&config)?;
            } else {
                print_monitored(&config, names);
            }
        }
        ItemsAction::Add { name } => {
            let item_id = names.resolve_item_id(&name);
            let (_, added) = store.update(|c| Ok(c.add_item(&item_id)))?;
            if added {
                println!("➕ Monitoring {} ({})", names.display_name(&item_id), item_id);
            } else {
                println!("{} is already monitored", item_id);
            }
        }
        ItemsAction::Remove { name } => {
            let item_id = names.resolve_item_id(&name);
            let (_, removed) = store.update(|c| Ok(c.remove_item(&item_id)))?;
            if removed {
                println!("❌ Removed {}", item_id);
            } else {
                println!("{} was not monitored", item_id);
            }
        }
        ItemsAction::Clear => {
            store.update(|c| {
                c.clear();
                Ok(())
            })?;
            println!("🧹 Monitored list cleared");
        }
        ItemsAction::Available => {
            let db = open_db(settings).await?;
            let items = db.list_items().await?;
            if json {
                print_json(&items)?;
            } else {
                for item_id in &items {
                    println!("{:<40} {}", item_id, names.display_name(item_id));
                }
                println!("\n{} items in snapshot", items.len());
            }
        }
    }
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_no_items() {
    println!("No monitored items. Add one with: mwimarket items add <name>");
}

fn print_monitored(config: &MonitorConfig, names: &NameMap) {
    println!("📅 Lookback: {} days", config.n_days);
    if config.items.is_empty() {
        println!("  (no monitored items)");
    }
    for (i, item_id) in config.items.iter().enumerate() {
        println!("  {:>2}. {} ({})", i + 1, names.display_name(item_id), item_id);
    }
}

fn print_failures(failures: &[ItemFailure]) {
    for failure in failures {
        println!(
            "⚠️  {} ({}) failed to load: {}",
            failure.display_name, failure.item_id, failure.error
        );
    }
}

fn insufficient_line<T>(section: &str, analysis: &Analysis<T>) -> Option<String> {
    analysis
        .reason()
        .map(|reason| format!("  {}: insufficient data ({})", section, reason))
}

fn print_item_batch(batch: &Batch<ItemReport>, n_days: u32) {
    for report in &batch.reports {
        print_item_report(report, n_days);
    }
    print_failures(&batch.failures);
}

fn print_item_report(report: &ItemReport, n_days: u32) {
    println!("\n{}", "═".repeat(60));
    println!(
        "📈 {} ({}): {}-day price trend, {} rows",
        report.display_name, report.item_id, n_days, report.rows
    );
    println!("{}", "═".repeat(60));

    match &report.history {
        Analysis::Ready(h) => println!(
            "  Latest bid/ask: {:.2} / {}",
            h.latest_bid,
            h.latest_ask.map_or("-".to_string(), |a| format!("{:.2}", a))
        ),
        other => println!("{}", insufficient_line("Price history", other).unwrap_or_default()),
    }

    match &report.trend {
        Analysis::Ready(t) => {
            println!("  Trend slope: {:.3}", t.slope);
            println!("  Latest price: {:.2}", t.latest_price);
        }
        other => println!("{}", insufficient_line("Trend", other).unwrap_or_default()),
    }

    match &report.moving_averages {
        Analysis::Ready(ma) => {
            let fmt = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{:.2}", v));
            println!(
                "  MA({}) {} / MA({}) {}: {} -> {:?}",
                ma.short_window,
                fmt(ma.short_ma),
                ma.long_window,
                fmt(ma.long_ma),
                ma.signal.label(),
                ma.action
            );
        }
        other => println!("{}", insufficient_line("Moving averages", other).unwrap_or_default()),
    }

    match &report.support_resistance {
        Analysis::Ready(sr) => {
            println!("  🔹 Support: {:.2}", sr.support);
            println!("  🔺 Resistance: {:.2}", sr.resistance);
            println!("  Current {:.2}: {}", sr.current, sr.zone.label());
        }
        other => println!(
            "{}",
            insufficient_line("Support/resistance", other).unwrap_or_default()
        ),
    }

    match &report.bollinger {
        Analysis::Ready(b) => println!(
            "  📊 Bollinger [{:.2}, {:.2}, {:.2}] price {:.2}: {}",
            b.lower,
            b.middle,
            b.upper,
            b.price,
            b.zone.label()
        ),
        other => println!("{}", insufficient_line("Bollinger", other).unwrap_or_default()),
    }
}

fn print_overview(batch: &Batch<OverviewEntry>) {
    println!("\n📊 Monitored items overview\n");
    println!(
        "{:<30} {:>12} {:>12} {:>8}",
        "Item", "Bid", "Ask", "Points"
    );
    println!("{}", "─".repeat(66));

    for entry in &batch.reports {
        match &entry.history {
            Analysis::Ready(h) => println!(
                "{:<30} {:>12.2} {:>12} {:>8}",
                entry.display_name,
                h.latest_bid,
                h.latest_ask.map_or("-".to_string(), |a| format!("{:.2}", a)),
                h.bid.len()
            ),
            Analysis::InsufficientData(reason) => {
                println!("{:<30} ⚠️  {}", entry.display_name, reason)
            }
        }
    }

    print_failures(&batch.failures);
}

fn print_correlation(page: &CorrelationPage, names: &NameMap) {
    print_failures(&page.failures);

    let report = match &page.report {
        Analysis::Ready(report) => report,
        Analysis::InsufficientData(reason) => {
            println!("⚠️  Cannot build correlation matrix: {}", reason);
            return;
        }
    };

    println!(
        "\n🔗 Price correlation ({} aligned rows)\n",
        report.aligned_rows
    );
    print!("{:<20}", "");
    for item_id in report.correlation.items() {
        print!(" {:>10}", truncate(names.display_name(item_id), 10));
    }
    println!();
    for (item_id, row) in report.correlation.items().iter().zip(report.correlation.values()) {
        print!("{:<20}", truncate(names.display_name(item_id), 20));
        for value in row {
            print!(" {:>10.3}", value);
        }
        println!();
    }

    println!(
        "\n🔮 Correlation-based forecast: {}",
        names.display_name(&report.target)
    );
    match &report.forecast {
        Analysis::Ready(f) => {
            let predictors: Vec<&str> = f.predictors.iter().map(|p| names.display_name(p)).collect();
            println!("  Predictors: {}", predictors.join(", "));
            if let Some(r2) = f.r_squared {
                println!("  Fit R²: {:.3}", r2);
            }
            println!("  Policy: {}", f.strategy);
            for (i, value) in f.predictions.iter().enumerate() {
                println!("  📍 Day {} forecast: {:.2}", i + 1, value);
            }
        }
        Analysis::InsufficientData(reason) => println!("  ⚠️  {}", reason),
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
