// crossover-core/src/backtest/accounting.rs

use super::errors::BacktestError;
use super::types::{AnnotatedBar, SignalBar};
use tracing::debug;

/// Turns signals into strategy returns and compounds both the strategy and a
/// passive buy & hold position from the same starting capital.
#[derive(Debug, Clone)]
pub struct ReturnAccountant {
    initial_capital: f64,
}

impl ReturnAccountant {
    pub fn new(initial_capital: f64) -> Result<Self, BacktestError> {
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(BacktestError::Config(format!(
                "initial capital must be positive, got {}",
                initial_capital
            )));
        }
        Ok(Self { initial_capital })
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Single ordered pass over the bars.
    ///
    /// The position earning day t's return is the signal decided at the close
    /// of day t-1. The first bar has no return and contributes a factor of 1.
    pub fn account(&self, bars: &[SignalBar]) -> Vec<AnnotatedBar> {
        let mut annotated = Vec::with_capacity(bars.len());
        let mut buy_hold_cum = 1.0;
        let mut strategy_cum = 1.0;
        let mut previous: Option<&SignalBar> = None;

        for bar in bars {
            let (daily_return, strategy_return) = match previous {
                Some(prev) => {
                    let daily = bar.close / prev.close - 1.0;
                    (Some(daily), Some(daily * prev.signal.exposure()))
                }
                None => (None, None),
            };

            if let Some(r) = daily_return {
                buy_hold_cum *= 1.0 + r;
            }
            if let Some(r) = strategy_return {
                strategy_cum *= 1.0 + r;
            }

            annotated.push(AnnotatedBar {
                date: bar.date,
                close: bar.close,
                short_avg: bar.short_avg,
                long_avg: bar.long_avg,
                signal: bar.signal,
                position_delta: bar.position_delta,
                daily_return,
                strategy_return,
                buy_hold_cum,
                strategy_cum,
                buy_hold_value: self.initial_capital * buy_hold_cum,
                strategy_value: self.initial_capital * strategy_cum,
            });

            previous = Some(bar);
        }

        if let Some(last) = annotated.last() {
            debug!(
                "Accounted {} bars: strategy {:.2}, buy & hold {:.2}",
                annotated.len(),
                last.strategy_value,
                last.buy_hold_value
            );
        }

        annotated
    }
}
