use crate::backtest::types::{
    BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW,
    DEFAULT_TICKER,
};
use crate::market_data::yahoo::YAHOO_CHART_URL;
use chrono::{Duration, NaiveDate};
use config::{Config, ConfigError, Environment, File};
use crossover_common::data::utils::DEFAULT_LOOKBACK_DAYS;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Yahoo,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct Backtest {
    pub ticker: String,
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: f64,
    pub lookback_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct Data {
    pub provider: Provider,
    pub yahoo_url: String,
    pub adjusted_close: bool,
    pub csv_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub backtest: Backtest,
    pub data: Data,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let csv_override = std::env::var("MARKET_DATA_CSV").ok();
        Self::load(&format!("config/{}", run_mode), csv_override)
    }

    /// Defaults, then the optional config file, then `CROSSOVER__*` env vars
    pub fn load(config_file: &str, csv_override: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("backtest.ticker", DEFAULT_TICKER)?
            .set_default("backtest.short_window", DEFAULT_SHORT_WINDOW as i64)?
            .set_default("backtest.long_window", DEFAULT_LONG_WINDOW as i64)?
            .set_default("backtest.initial_capital", DEFAULT_INITIAL_CAPITAL)?
            .set_default("backtest.lookback_days", DEFAULT_LOOKBACK_DAYS)?
            .set_default("data.provider", "yahoo")?
            .set_default("data.yahoo_url", YAHOO_CHART_URL)?
            .set_default("data.adjusted_close", true)?
            .add_source(File::with_name(config_file).required(false))
            .add_source(Environment::with_prefix("CROSSOVER").separator("__"));

        if let Some(csv_path) = csv_override {
            builder = builder
                .set_override("data.provider", "csv")?
                .set_override("data.csv_path", csv_path)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }

    /// Backtest parameters for a run ending on `end_date`
    pub fn backtest_config(&self, end_date: NaiveDate) -> BacktestConfig {
        BacktestConfig {
            ticker: self.backtest.ticker.clone(),
            start_date: end_date - Duration::days(self.backtest.lookback_days),
            end_date,
            short_window: self.backtest.short_window,
            long_window: self.backtest.long_window,
            initial_capital: self.backtest.initial_capital,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crossover-config-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("testing.toml");
        std::fs::write(&path, contents).unwrap();
        dir.join("testing")
    }

    #[test]
    fn test_defaults_without_config_file() {
        let settings = Settings::load("config/does-not-exist", None).unwrap();

        assert_eq!(settings.backtest.ticker, "SPY");
        assert_eq!(settings.backtest.short_window, 50);
        assert_eq!(settings.backtest.long_window, 200);
        assert_eq!(settings.backtest.initial_capital, 100_000.0);
        assert_eq!(settings.data.provider, Provider::Yahoo);
        assert!(settings.data.adjusted_close);
        assert!(settings.data.csv_path.is_none());

        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let config = settings.backtest_config(end);
        assert_eq!(config.end_date, end);
        assert_eq!((end - config.start_date).num_days(), 1825);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = temp_config(
            "file",
            r#"
[backtest]
ticker = "QQQ"
short_window = 20
long_window = 100
initial_capital = 25000.0

[data]
adjusted_close = false
"#,
        );

        let settings = Settings::load(file.to_str().unwrap(), None).unwrap();
        assert_eq!(settings.backtest.ticker, "QQQ");
        assert_eq!(settings.backtest.short_window, 20);
        assert_eq!(settings.backtest.long_window, 100);
        assert_eq!(settings.backtest.initial_capital, 25_000.0);
        assert_eq!(settings.backtest.lookback_days, 1825);
        assert!(!settings.data.adjusted_close);
    }

    #[test]
    fn test_csv_override_switches_provider() {
        let settings =
            Settings::load("config/does-not-exist", Some("data/spy.csv".to_string())).unwrap();
        assert_eq!(settings.data.provider, Provider::Csv);
        assert_eq!(settings.data.csv_path.as_deref(), Some("data/spy.csv"));
    }
}
