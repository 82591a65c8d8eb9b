// crossover-core/src/backtest/metrics.rs

use super::types::*;

/// Trading days per year used to annualize the daily Sharpe ratio
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub struct MetricsCalculator {
    trading_days_per_year: f64,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCalculator {
    pub fn new() -> Self {
        Self {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }

    /// Reduce an accounted series to summary metrics.
    ///
    /// Undefined statistics come back as `None` with a matching warning;
    /// nothing here fails.
    pub fn calculate(
        &self,
        bars: &[AnnotatedBar],
        config: &BacktestConfig,
    ) -> (Metrics, Vec<BacktestWarning>) {
        let mut warnings = Vec::new();
        let initial = config.initial_capital;

        let required = config.short_window.max(config.long_window);
        if bars.len() < required {
            warnings.push(BacktestWarning::InsufficientData {
                bars: bars.len(),
                required,
            });
        }

        let final_strategy_value = bars.last().map_or(initial, |b| b.strategy_value);
        let final_buy_hold_value = bars.last().map_or(initial, |b| b.buy_hold_value);

        let years = config.years();
        if years <= 0.0 {
            warnings.push(BacktestWarning::NonPositiveYears { years });
        }

        let strategy_annual_return = self.annualized_return(final_strategy_value, initial, years);
        let buy_hold_annual_return = self.annualized_return(final_buy_hold_value, initial, years);
        if years > 0.0 {
            if strategy_annual_return.is_none() {
                warnings.push(BacktestWarning::NonPositiveGrowth {
                    series: ReturnSeries::Strategy,
                });
            }
            if buy_hold_annual_return.is_none() {
                warnings.push(BacktestWarning::NonPositiveGrowth {
                    series: ReturnSeries::BuyHold,
                });
            }
        }

        let strategy_sharpe = self.sharpe_ratio(&strategy_returns(bars));
        if strategy_sharpe.is_none() {
            warnings.push(BacktestWarning::ZeroVariance {
                series: ReturnSeries::Strategy,
            });
        }
        let buy_hold_sharpe = self.sharpe_ratio(&daily_returns(bars));
        if buy_hold_sharpe.is_none() {
            warnings.push(BacktestWarning::ZeroVariance {
                series: ReturnSeries::BuyHold,
            });
        }

        let strategy_values: Vec<f64> = bars.iter().map(|b| b.strategy_value).collect();

        let metrics = Metrics {
            buy_hold_total_return: self.total_return(final_buy_hold_value, initial),
            strategy_total_return: self.total_return(final_strategy_value, initial),
            buy_hold_annual_return,
            strategy_annual_return,
            buy_hold_sharpe,
            strategy_sharpe,
            max_drawdown: self.max_drawdown(&strategy_values),
            trade_count: self.trade_count(bars),
            initial_capital: initial,
            final_strategy_value,
            final_buy_hold_value,
            years,
            bars: bars.len(),
        };

        (metrics, warnings)
    }

    /// Total return in percent
    pub fn total_return(&self, final_value: f64, initial_capital: f64) -> f64 {
        (final_value / initial_capital - 1.0) * 100.0
    }

    /// Compound annual growth rate in percent
    pub fn annualized_return(&self, final_value: f64, initial_capital: f64, years: f64) -> Option<f64> {
        let growth = final_value / initial_capital;
        if years <= 0.0 || !growth.is_finite() || growth <= 0.0 {
            return None;
        }

        let annual = (growth.powf(1.0 / years) - 1.0) * 100.0;
        annual.is_finite().then_some(annual)
    }

    /// mean / sample stdev of daily returns, scaled by sqrt(252); zero risk-free rate
    pub fn sharpe_ratio(&self, returns: &[f64]) -> Option<f64> {
        if returns.len() < 2 {
            return None;
        }

        // Constant returns have no variance even when the float mean drifts off them
        if returns.iter().all(|&r| r == returns[0]) {
            return None;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let stdev = variance.sqrt();

        if !stdev.is_finite() || stdev <= f64::EPSILON * mean.abs() {
            return None;
        }

        Some(mean / stdev * self.trading_days_per_year.sqrt())
    }

    /// Most negative drawdown in percent; 0 when the curve never falls below a peak
    pub fn max_drawdown(&self, values: &[f64]) -> f64 {
        drawdown_curve(values).into_iter().fold(0.0, f64::min)
    }

    /// Bars whose position changed, including moves into and out of neutral
    pub fn trade_count(&self, bars: &[AnnotatedBar]) -> usize {
        bars.iter().filter(|b| b.position_delta != 0).count()
    }
}

/// Percent decline of each value from its running peak
pub fn drawdown_curve(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            (value - peak) / peak * 100.0
        })
        .collect()
}

/// Defined daily strategy returns, first bar excluded
pub fn strategy_returns(bars: &[AnnotatedBar]) -> Vec<f64> {
    bars.iter().filter_map(|b| b.strategy_return).collect()
}

/// Defined daily price returns, first bar excluded
pub fn daily_returns(bars: &[AnnotatedBar]) -> Vec<f64> {
    bars.iter().filter_map(|b| b.daily_return).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn config(capital: f64, start: NaiveDate, end: NaiveDate) -> BacktestConfig {
        BacktestConfig {
            ticker: "TEST".to_string(),
            start_date: start,
            end_date: end,
            short_window: 2,
            long_window: 4,
            initial_capital: capital,
        }
    }

    fn flat_bar(day: i64, delta: i8, value: f64) -> AnnotatedBar {
        AnnotatedBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day),
            close: 100.0,
            short_avg: None,
            long_avg: None,
            signal: Signal::Neutral,
            position_delta: delta,
            daily_return: if day == 0 { None } else { Some(0.0) },
            strategy_return: if day == 0 { None } else { Some(0.0) },
            buy_hold_cum: 1.0,
            strategy_cum: value / 1000.0,
            buy_hold_value: 1000.0,
            strategy_value: value,
        }
    }

    #[test]
    fn test_total_return() {
        let calc = MetricsCalculator::new();
        assert!((calc.total_return(1100.0, 1000.0) - 10.0).abs() < 1e-9);
        assert!((calc.total_return(900.0, 1000.0) + 10.0).abs() < 1e-9);
        assert_eq!(calc.total_return(1000.0, 1000.0), 0.0);
    }

    #[test]
    fn test_annualized_equals_total_over_one_year() {
        let calc = MetricsCalculator::new();
        for final_value in [500.0, 1000.0, 1234.5, 3000.0] {
            let total = calc.total_return(final_value, 1000.0);
            let annual = calc.annualized_return(final_value, 1000.0, 1.0).unwrap();
            assert!((annual - total).abs() < 1e-9);
        }
    }

    #[test]
    fn test_annualized_compounds() {
        let calc = MetricsCalculator::new();
        let annual = calc.annualized_return(1210.0, 1000.0, 2.0).unwrap();
        assert!((annual - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_annualized_undefined_cases() {
        let calc = MetricsCalculator::new();
        assert_eq!(calc.annualized_return(1100.0, 1000.0, 0.0), None);
        assert_eq!(calc.annualized_return(1100.0, 1000.0, -1.0), None);
        assert_eq!(calc.annualized_return(0.0, 1000.0, 1.0), None);
        assert_eq!(calc.annualized_return(-5.0, 1000.0, 1.0), None);
    }

    #[test]
    fn test_sharpe_ratio() {
        let calc = MetricsCalculator::new();
        let returns = [0.01, -0.005, 0.02, 0.0];
        // mean = 0.00625, sample stdev = sqrt(0.00036875 / 3)
        let expected = 0.00625 / (0.00036875f64 / 3.0).sqrt() * 252f64.sqrt();
        assert!((calc.sharpe_ratio(&returns).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sharpe_undefined_without_variance() {
        let calc = MetricsCalculator::new();
        assert_eq!(calc.sharpe_ratio(&[]), None);
        assert_eq!(calc.sharpe_ratio(&[0.01]), None);
        assert_eq!(calc.sharpe_ratio(&[0.0, 0.0, 0.0]), None);
        assert_eq!(calc.sharpe_ratio(&[0.5, 0.5]), None);
    }

    #[test]
    fn test_sharpe_undefined_for_inexact_constant_returns() {
        let calc = MetricsCalculator::new();
        // 0.1 and 0.01 are not exact in binary, so the summed mean misses them by an ulp
        assert_eq!(calc.sharpe_ratio(&[0.1; 3]), None);
        assert_eq!(calc.sharpe_ratio(&[0.01; 10]), None);
        assert_eq!(calc.sharpe_ratio(&[-0.003; 7]), None);
        assert!(calc.sharpe_ratio(&[0.1, 0.1, 0.1000001]).is_some());
    }

    #[test]
    fn test_drawdown_curve_and_max() {
        let values = [100.0, 120.0, 90.0, 130.0, 117.0];
        let curve = drawdown_curve(&values);
        assert_eq!(curve[0], 0.0);
        assert_eq!(curve[1], 0.0);
        assert!((curve[2] + 25.0).abs() < 1e-9);
        assert_eq!(curve[3], 0.0);
        assert!((curve[4] + 10.0).abs() < 1e-9);

        let calc = MetricsCalculator::new();
        assert!((calc.max_drawdown(&values) + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_drawdown_zero_when_never_below_peak() {
        let calc = MetricsCalculator::new();
        assert_eq!(calc.max_drawdown(&[100.0, 100.0, 101.0, 150.0]), 0.0);
        assert_eq!(calc.max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_trade_count_counts_every_flip() {
        // signals [0,0,1,1,-1,-1,0,1] -> deltas [0,0,1,0,-2,0,1,1]
        let deltas = [0, 0, 1, 0, -2, 0, 1, 1];
        let bars: Vec<AnnotatedBar> = deltas
            .iter()
            .enumerate()
            .map(|(i, &d)| flat_bar(i as i64, d, 1000.0))
            .collect();

        assert_eq!(MetricsCalculator::new().trade_count(&bars), 4);
    }

    #[test]
    fn test_calculate_reports_undefined_metrics_as_warnings() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<AnnotatedBar> = (0..3).map(|i| flat_bar(i, 0, 1000.0)).collect();
        let (metrics, warnings) =
            MetricsCalculator::new().calculate(&bars, &config(1000.0, start, start));

        assert_eq!(metrics.strategy_sharpe, None);
        assert_eq!(metrics.buy_hold_sharpe, None);
        assert_eq!(metrics.strategy_annual_return, None);
        assert_eq!(metrics.max_drawdown, 0.0);
        assert_eq!(metrics.trade_count, 0);
        assert_eq!(metrics.bars, 3);

        assert!(warnings.contains(&BacktestWarning::InsufficientData { bars: 3, required: 4 }));
        assert!(warnings.contains(&BacktestWarning::NonPositiveYears { years: 0.0 }));
        assert!(warnings.contains(&BacktestWarning::ZeroVariance {
            series: ReturnSeries::Strategy
        }));
        assert!(warnings.contains(&BacktestWarning::ZeroVariance {
            series: ReturnSeries::BuyHold
        }));
    }

    #[test]
    fn test_calculate_capital_figures() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = start + Duration::days(365);
        let values = [1000.0, 1100.0, 1050.0, 1200.0];
        let bars: Vec<AnnotatedBar> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| flat_bar(i as i64, 0, v))
            .collect();
        let (metrics, _) = MetricsCalculator::new().calculate(&bars, &config(1000.0, start, end));

        assert_eq!(metrics.initial_capital, 1000.0);
        assert_eq!(metrics.final_strategy_value, 1200.0);
        assert_eq!(metrics.final_buy_hold_value, 1000.0);
        assert!((metrics.strategy_total_return - 20.0).abs() < 1e-9);
        assert!((metrics.years - 365.0 / 365.25).abs() < 1e-12);
        assert!((metrics.max_drawdown - (1050.0 / 1100.0 - 1.0) * 100.0).abs() < 1e-9);
    }
}
