// Monitored-item configuration and application settings

pub mod settings;

pub use settings::{DatabaseSettings, Settings};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{MarketError, Result};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;
pub const MAX_LOOKBACK_DAYS: u32 = 90;

fn default_lookback() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

/// Items the user watches and how far back to look
///
/// Item order is the order they were added in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default = "default_lookback")]
    pub n_days: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            n_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl MonitorConfig {
    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i == item_id)
    }

    /// Append `item_id`, returns false if it was already monitored
    pub fn add_item(&mut self, item_id: &str) -> bool {
        if self.contains(item_id) {
            return false;
        }
        self.items.push(item_id.to_string());
        true
    }

    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != item_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn set_lookback(&mut self, days: u32) -> Result<()> {
        if !(1..=MAX_LOOKBACK_DAYS).contains(&days) {
            return Err(MarketError::InvalidLookback(days));
        }
        self.n_days = days;
        Ok(())
    }
}

/// JSON file holding the [`MonitorConfig`]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config, or the default one when the file does not exist yet
    pub fn load(&self) -> Result<MonitorConfig> {
        if !self.path.exists() {
            tracing::debug!("No config at {}, using defaults", self.path.display());
            return Ok(MonitorConfig::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let mut config: MonitorConfig = serde_json::from_str(&raw)?;

        // Hand-edited files can carry any lookback
        let clamped = config.n_days.clamp(1, MAX_LOOKBACK_DAYS);
        if clamped != config.n_days {
            tracing::warn!(
                "Lookback of {} days in {} is out of range, using {}",
                config.n_days,
                self.path.display(),
                clamped
            );
            config.n_days = clamped;
        }

        Ok(config)
    }

    pub fn save(&self, config: &MonitorConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Load, apply `mutate`, save. Every mutation is persisted right away.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut MonitorConfig) -> Result<R>) -> Result<(MonitorConfig, R)> {
        let mut config = self.load()?;
        let outcome = mutate(&mut config)?;
        self.save(&config)?;
        Ok((config, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mwimarket-config-{}-{}", name, std::process::id()))
            .join("config.json")
    }

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert!(config.items.is_empty());
        assert_eq!(config.n_days, 7);
    }

    #[test]
    fn test_add_keeps_order_and_ignores_duplicates() {
        let mut config = MonitorConfig::default();
        assert!(config.add_item("Milk"));
        assert!(config.add_item("Iron Bar"));
        assert!(!config.add_item("Milk"));
        assert_eq!(config.items, vec!["Milk", "Iron Bar"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut config = MonitorConfig::default();
        config.add_item("a");
        config.add_item("b");
        assert!(config.remove_item("a"));
        assert!(!config.remove_item("a"));
        assert_eq!(config.items, vec!["b"]);
        config.clear();
        assert!(config.items.is_empty());
    }

    #[test]
    fn test_lookback_bounds() {
        let mut config = MonitorConfig::default();
        assert!(config.set_lookback(30).is_ok());
        assert_eq!(config.n_days, 30);
        assert!(matches!(config.set_lookback(0), Err(MarketError::InvalidLookback(0))));
        assert!(config.set_lookback(91).is_err());
        assert_eq!(config.n_days, 30);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: MonitorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_store_round_trip_and_update() {
        let path = scratch_path("roundtrip");
        let store = ConfigStore::new(&path);
        assert_eq!(store.load().unwrap(), MonitorConfig::default());

        let (config, added) = store.update(|c| Ok(c.add_item("牛奶"))).unwrap();
        assert!(added);
        assert_eq!(config.items, vec!["牛奶"]);

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, config);
        // Non-ASCII names are written as-is
        assert!(std::fs::read_to_string(&path).unwrap().contains("牛奶"));

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_out_of_range_lookback_is_clamped_on_load() {
        let path = scratch_path("clamp");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let store = ConfigStore::new(&path);

        std::fs::write(&path, r#"{"items":["Milk"],"n_days":4000000000}"#).unwrap();
        let config = store.load().unwrap();
        assert_eq!(config.n_days, MAX_LOOKBACK_DAYS);
        assert_eq!(config.items, vec!["Milk"]);

        std::fs::write(&path, r#"{"items":[],"n_days":0}"#).unwrap();
        assert_eq!(store.load().unwrap().n_days, 1);

        // The lookback command can still repair the file
        let (config, _) = store.update(|c| c.set_lookback(14)).unwrap();
        assert_eq!(config.n_days, 14);

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_failed_update_is_not_saved() {
        let path = scratch_path("failed");
        let store = ConfigStore::new(&path);
        let result = store.update(|c| c.set_lookback(500));
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
