// crossover-core/src/backtest/types.rs

use super::errors::BacktestError;
use chrono::{NaiveDate, Utc};
use crossover_common::data::{default_date_range, years_between, PriceRequest};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TICKER: &str = "SPY";
pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    /// SPY, 50/200 day averages, $100,000, five years ending today
    fn default() -> Self {
        let (start_date, end_date) = default_date_range(Utc::now().date_naive());
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            start_date,
            end_date,
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.ticker.trim().is_empty() {
            return Err(BacktestError::Config("ticker cannot be empty".to_string()));
        }
        if self.short_window == 0 || self.long_window == 0 {
            return Err(BacktestError::Config(format!(
                "moving average windows must be positive (short={}, long={})",
                self.short_window, self.long_window
            )));
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(BacktestError::Config(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        Ok(())
    }

    /// Elapsed years between the configured start and end dates
    pub fn years(&self) -> f64 {
        years_between(self.start_date, self.end_date)
    }

    pub fn price_request(&self) -> PriceRequest {
        PriceRequest::new(&self.ticker, self.start_date, self.end_date)
    }
}

/// Position held after the close of a bar.
///
/// Exactly equal averages map to `Neutral`, as does any bar where either
/// average is still undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Short,
    #[default]
    Neutral,
    Long,
}

impl Signal {
    pub fn from_averages(short_avg: Option<f64>, long_avg: Option<f64>) -> Self {
        match (short_avg, long_avg) {
            (Some(s), Some(l)) if s > l => Signal::Long,
            (Some(s), Some(l)) if s < l => Signal::Short,
            _ => Signal::Neutral,
        }
    }

    pub fn value(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Neutral => 0,
            Signal::Long => 1,
        }
    }

    /// Exposure multiplier applied to the next day's return
    pub fn exposure(self) -> f64 {
        f64::from(self.value())
    }
}

/// Direct long/short reversal, i.e. a position delta of +2 or -2.
/// Moves through `Neutral` are not crossovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    Buy,
    Sell,
}

impl Crossover {
    pub fn from_delta(position_delta: i8) -> Option<Self> {
        match position_delta {
            2 => Some(Crossover::Buy),
            -2 => Some(Crossover::Sell),
            _ => None,
        }
    }
}

// Signal engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBar {
    pub date: NaiveDate,
    pub close: f64,
    pub short_avg: Option<f64>,
    pub long_avg: Option<f64>,
    pub signal: Signal,
    /// signal[t] - signal[t-1], with the bar before the first treated as neutral
    pub position_delta: i8,
}

impl SignalBar {
    pub fn crossover(&self) -> Option<Crossover> {
        Crossover::from_delta(self.position_delta)
    }
}

// Fully accounted bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    pub date: NaiveDate,
    pub close: f64,
    pub short_avg: Option<f64>,
    pub long_avg: Option<f64>,
    pub signal: Signal,
    pub position_delta: i8,
    pub daily_return: Option<f64>,
    pub strategy_return: Option<f64>,
    pub buy_hold_cum: f64,
    pub strategy_cum: f64,
    pub buy_hold_value: f64,
    pub strategy_value: f64,
}

impl AnnotatedBar {
    pub fn crossover(&self) -> Option<Crossover> {
        Crossover::from_delta(self.position_delta)
    }
}

/// Return stream a statistic was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnSeries {
    Strategy,
    BuyHold,
}

impl fmt::Display for ReturnSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnSeries::Strategy => write!(f, "strategy"),
            ReturnSeries::BuyHold => write!(f, "buy & hold"),
        }
    }
}

/// Non-fatal conditions that leave some metrics undefined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BacktestWarning {
    InsufficientData { bars: usize, required: usize },
    ZeroVariance { series: ReturnSeries },
    NonPositiveYears { years: f64 },
    NonPositiveGrowth { series: ReturnSeries },
}

impl fmt::Display for BacktestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BacktestWarning::InsufficientData { bars, required } => write!(
                f,
                "only {} bars available, {} needed before any signal can fire",
                bars, required
            ),
            BacktestWarning::ZeroVariance { series } => {
                write!(f, "{} returns have no variance, Sharpe ratio undefined", series)
            }
            BacktestWarning::NonPositiveYears { years } => write!(
                f,
                "elapsed period of {:.4} years is not positive, annualized return undefined",
                years
            ),
            BacktestWarning::NonPositiveGrowth { series } => write!(
                f,
                "{} growth factor is not positive, annualized return undefined",
                series
            ),
        }
    }
}

// Performance metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    // Returns (percent)
    pub buy_hold_total_return: f64,
    pub strategy_total_return: f64,
    pub buy_hold_annual_return: Option<f64>,
    pub strategy_annual_return: Option<f64>,

    // Risk
    pub buy_hold_sharpe: Option<f64>,
    pub strategy_sharpe: Option<f64>,
    pub max_drawdown: f64,

    // Activity
    pub trade_count: usize,

    // Capital
    pub initial_capital: f64,
    pub final_strategy_value: f64,
    pub final_buy_hold_value: f64,

    pub years: f64,
    pub bars: usize,
}

// Backtest result handed to the reporter
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub config: BacktestConfig,
    pub bars: Vec<AnnotatedBar>,
    pub drawdown_curve: Vec<f64>,
    pub metrics: Metrics,
    pub warnings: Vec<BacktestWarning>,
}

impl BacktestResult {
    /// Buy and sell markers for the price view
    pub fn crossovers(&self) -> impl Iterator<Item = (&AnnotatedBar, Crossover)> {
        self.bars
            .iter()
            .filter_map(|bar| bar.crossover().map(|c| (bar, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_from_averages() {
        assert_eq!(Signal::from_averages(Some(2.0), Some(1.0)), Signal::Long);
        assert_eq!(Signal::from_averages(Some(1.0), Some(2.0)), Signal::Short);
        assert_eq!(Signal::from_averages(Some(1.5), Some(1.5)), Signal::Neutral);
        assert_eq!(Signal::from_averages(None, Some(1.0)), Signal::Neutral);
        assert_eq!(Signal::from_averages(Some(1.0), None), Signal::Neutral);
        assert_eq!(Signal::from_averages(None, None), Signal::Neutral);
    }

    #[test]
    fn test_crossover_only_on_full_reversal() {
        assert_eq!(Crossover::from_delta(2), Some(Crossover::Buy));
        assert_eq!(Crossover::from_delta(-2), Some(Crossover::Sell));
        assert_eq!(Crossover::from_delta(1), None);
        assert_eq!(Crossover::from_delta(-1), None);
        assert_eq!(Crossover::from_delta(0), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = BacktestConfig::default();
        assert_eq!(config.ticker, "SPY");
        assert_eq!(config.short_window, 50);
        assert_eq!(config.long_window, 200);
        assert_eq!(config.initial_capital, 100_000.0);
        assert_eq!((config.end_date - config.start_date).num_days(), 1825);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BacktestConfig::default();
        config.short_window = 0;
        assert!(matches!(config.validate(), Err(BacktestError::Config(_))));

        let mut config = BacktestConfig::default();
        config.initial_capital = 0.0;
        assert!(config.validate().is_err());
        config.initial_capital = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = BacktestConfig::default();
        config.ticker = "  ".to_string();
        assert!(config.validate().is_err());

        // Window ordering is not enforced
        let mut config = BacktestConfig::default();
        config.short_window = 200;
        config.long_window = 50;
        assert!(config.validate().is_ok());
    }
}
