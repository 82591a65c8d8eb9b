// crossover-core/src/backtest/signal.rs

use super::errors::BacktestError;
use super::types::{Signal, SignalBar};
use crossover_common::data::PriceSeries;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Trailing window over the last `period` values.
///
/// The mean is re-reduced from the buffer on every push, oldest value first,
/// so it matches a plain slice mean bit for bit (no running-sum drift).
#[derive(Debug, Clone)]
struct RollingMean {
    period: usize,
    window: VecDeque<f64>,
}

impl RollingMean {
    fn new(period: usize) -> Self {
        Self {
            period,
            window: VecDeque::with_capacity(period),
        }
    }

    fn push(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }

        if self.window.len() == self.period {
            Some(self.window.iter().sum::<f64>() / self.period as f64)
        } else {
            None
        }
    }
}

/// Simple moving average; `None` until `period` values have been seen.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    let mut rolling = RollingMean::new(period);
    values.iter().map(|&v| rolling.push(v)).collect()
}

/// Derives a long/short/neutral signal per bar from two moving averages
#[derive(Debug, Clone)]
pub struct SignalEngine {
    short_window: usize,
    long_window: usize,
}

impl SignalEngine {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, BacktestError> {
        if short_window == 0 || long_window == 0 {
            return Err(BacktestError::Config(format!(
                "moving average windows must be positive (short={}, long={})",
                short_window, long_window
            )));
        }
        if long_window <= short_window {
            warn!(
                "Long window ({}) is not longer than short window ({}), crossover signals are inverted or flat",
                long_window, short_window
            );
        }

        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    pub fn generate(&self, series: &PriceSeries) -> Vec<SignalBar> {
        let closes = series.closes();
        let short = sma(&closes, self.short_window);
        let long = sma(&closes, self.long_window);

        let mut previous = Signal::Neutral;
        let bars: Vec<SignalBar> = series
            .bars()
            .iter()
            .zip(short)
            .zip(long)
            .map(|((bar, short_avg), long_avg)| {
                let signal = Signal::from_averages(short_avg, long_avg);
                let position_delta = signal.value() - previous.value();
                previous = signal;

                SignalBar {
                    date: bar.date,
                    close: bar.close,
                    short_avg,
                    long_avg,
                    signal,
                    position_delta,
                }
            })
            .collect();

        debug!(
            "Generated {} signals for {} ({}/{} day averages)",
            bars.len(),
            series.ticker(),
            self.short_window,
            self.long_window
        );

        bars
    }
}
