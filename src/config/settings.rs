use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::db::DEFAULT_DB_URL;
use crate::forecast::ForecastConfig;
use crate::indicators::IndicatorConfig;
use crate::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Local snapshot file
    pub path: PathBuf,
    /// Where to fetch the snapshot from when it is missing
    pub url: String,
}

/// Application settings
///
/// Layered: built-in defaults, then `mwimarket.toml` (or the file passed
/// in), then `MWI__*` environment variables, e.g. `MWI__DATABASE__PATH`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub monitor_config_path: PathBuf,
    pub name_map_path: PathBuf,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

const ENV_PREFIX: &str = "MWI";

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_env_prefix(file, ENV_PREFIX)
    }

    fn load_with_env_prefix(file: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("database.path", "cache/market.db")?
            .set_default("database.url", DEFAULT_DB_URL)?
            .set_default("monitor_config_path", "config/config.json")?
            .set_default("name_map_path", "config/name_map_spaces.json")?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("mwimarket").required(false)),
        };

        let settings = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastPolicy;
    use crate::indicators::StdDevKind;

    /// Empty settings file with an env prefix nothing sets, so neither
    /// `./mwimarket.toml` nor `MWI__*` variables leak into the test
    fn load_isolated(contents: &str, name: &str) -> Settings {
        let dir = std::env::temp_dir().join(format!("mwimarket-settings-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, contents).unwrap();

        let settings = Settings::load_with_env_prefix(Some(&path), "MWI_UNSET_TEST").unwrap();
        std::fs::remove_dir_all(&dir).ok();
        settings
    }

    #[test]
    fn test_defaults() {
        let settings = load_isolated("", "defaults");
        assert_eq!(settings.database.path, PathBuf::from("cache/market.db"));
        assert_eq!(settings.database.url, DEFAULT_DB_URL);
        assert_eq!(settings.monitor_config_path, PathBuf::from("config/config.json"));
        assert_eq!(settings.indicators, IndicatorConfig::default());
        assert_eq!(settings.forecast, ForecastConfig::default());
    }

    #[test]
    fn test_file_overrides() {
        let settings = load_isolated(
            r#"
name_map_path = "names.json"

[database]
path = "/tmp/snap.db"

[indicators]
long_ma_window = 50
bollinger_std_kind = "population"

[forecast]
top_n = 4
policy = "repeat-latest"
"#,
            "overrides",
        );

        assert_eq!(settings.database.path, PathBuf::from("/tmp/snap.db"));
        assert_eq!(settings.name_map_path, PathBuf::from("names.json"));
        assert_eq!(settings.indicators.long_ma_window, 50);
        assert_eq!(settings.indicators.short_ma_window, 5);
        assert_eq!(settings.indicators.bollinger_std_kind, StdDevKind::Population);
        assert_eq!(settings.forecast.top_n, 4);
        assert_eq!(settings.forecast.days, 3);
        assert_eq!(settings.forecast.policy, ForecastPolicy::RepeatLatest);
    }

    #[test]
    fn test_environment_overrides_file() {
        std::env::set_var("MWI_ENV_TEST__FORECAST__TOP_N", "6");

        let dir = std::env::temp_dir().join(format!("mwimarket-settings-env-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[forecast]\ntop_n = 4\ndays = 5\n").unwrap();

        let settings = Settings::load_with_env_prefix(Some(&path), "MWI_ENV_TEST").unwrap();
        assert_eq!(settings.forecast.top_n, 6);
        assert_eq!(settings.forecast.days, 5);

        std::env::remove_var("MWI_ENV_TEST__FORECAST__TOP_N");
        std::fs::remove_dir_all(&dir).ok();
    }
}
