// crossover-core/src/backtest/engine.rs

use super::accounting::ReturnAccountant;
use super::errors::BacktestError;
use super::metrics::{drawdown_curve, MetricsCalculator};
use super::signal::SignalEngine;
use super::types::*;
use crate::market_data::PriceSource;
use crossover_common::data::PriceSeries;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches a price series and runs the crossover pipeline over it
pub struct BacktestEngine {
    source: Arc<dyn PriceSource>,
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(source: Arc<dyn PriceSource>, config: BacktestConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<BacktestResult, BacktestError> {
        self.config.validate()?;

        let request = self.config.price_request();
        info!(
            "Downloading {} data from {} to {} via {}",
            request.ticker,
            request.start_date,
            request.end_date,
            self.source.name()
        );

        let series = self.source.fetch_daily_bars(&request).await?;
        info!("Downloaded {} days of data", series.len());

        run_backtest(&series, &self.config)
    }
}

/// Signal -> accounting -> metrics over an already materialized series
pub fn run_backtest(series: &PriceSeries, config: &BacktestConfig) -> Result<BacktestResult, BacktestError> {
    config.validate()?;

    let signals = SignalEngine::new(config.short_window, config.long_window)?.generate(series);
    let bars = ReturnAccountant::new(config.initial_capital)?.account(&signals);
    let (metrics, warnings) = MetricsCalculator::new().calculate(&bars, config);

    for warning in &warnings {
        warn!("{}", warning);
    }

    let strategy_values: Vec<f64> = bars.iter().map(|b| b.strategy_value).collect();
    let drawdown_curve = drawdown_curve(&strategy_values);

    info!(
        "Backtest complete for {}: strategy {:.2}%, buy & hold {:.2}%, {} trades",
        series.ticker(),
        metrics.strategy_total_return,
        metrics.buy_hold_total_return,
        metrics.trade_count
    );

    Ok(BacktestResult {
        config: config.clone(),
        bars,
        drawdown_curve,
        metrics,
        warnings,
    })
}
