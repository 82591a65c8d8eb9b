// =================================================================
// report.rs - Console Reporting
// =================================================================

use crate::backtest::types::{AnnotatedBar, BacktestConfig, BacktestResult, Crossover, Metrics};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::fmt::Write;

const RULE_WIDTH: usize = 60;
const UNDEFINED: &str = "n/a";

/// Round half to even at 2 dp, e.g. `6.796` -> `"6.80"`
pub fn format_number(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(d) => format!("{:.2}", d.round_dp(2)),
        None => UNDEFINED.to_string(),
    }
}

pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), format_number)
}

/// Whole-dollar amount with thousands separators, e.g. `$100,000`
pub fn format_currency(value: f64) -> String {
    let Some(amount) = Decimal::from_f64(value) else {
        return UNDEFINED.to_string();
    };

    let rounded = amount.round_dp(0);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Labelled metric rows in display order
pub fn metrics_table(metrics: &Metrics) -> Vec<(&'static str, String)> {
    vec![
        ("Buy & Hold Total Return (%)", format_number(metrics.buy_hold_total_return)),
        ("Strategy Total Return (%)", format_number(metrics.strategy_total_return)),
        ("Buy & Hold Annual Return (%)", format_optional(metrics.buy_hold_annual_return)),
        ("Strategy Annual Return (%)", format_optional(metrics.strategy_annual_return)),
        ("Buy & Hold Sharpe Ratio", format_optional(metrics.buy_hold_sharpe)),
        ("Strategy Sharpe Ratio", format_optional(metrics.strategy_sharpe)),
        ("Maximum Drawdown (%)", format_number(metrics.max_drawdown)),
        ("Number of Trades", metrics.trade_count.to_string()),
        ("Initial Capital", format_currency(metrics.initial_capital)),
        ("Final Strategy Value", format_currency(metrics.final_strategy_value)),
        ("Final Buy & Hold Value", format_currency(metrics.final_buy_hold_value)),
    ]
}

pub fn render_header(config: &BacktestConfig) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "MOVING AVERAGE CROSSOVER BACKTEST");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Ticker: {}", config.ticker);
    let _ = writeln!(out, "Period: {} to {}", config.start_date, config.end_date);
    let _ = writeln!(
        out,
        "Short MA: {} days | Long MA: {} days",
        config.short_window, config.long_window
    );
    let _ = writeln!(out, "Initial Capital: {}", format_currency(config.initial_capital));
    let _ = writeln!(out, "{}", rule);
    out
}

pub fn render_metrics(metrics: &Metrics) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "PERFORMANCE METRICS");
    let _ = writeln!(out, "{}", rule);
    for (label, value) in metrics_table(metrics) {
        let _ = writeln!(out, "{:.<45} {}", label, value);
    }
    let _ = writeln!(out, "{}", rule);
    out
}

pub fn render_crossovers(result: &BacktestResult) -> String {
    let mut out = String::new();
    let events: Vec<(&AnnotatedBar, Crossover)> = result.crossovers().collect();
    if events.is_empty() {
        let _ = writeln!(out, "No crossovers in period");
        return out;
    }

    let _ = writeln!(out, "Crossovers:");
    for (bar, event) in events {
        let label = match event {
            Crossover::Buy => "BUY ",
            Crossover::Sell => "SELL",
        };
        let _ = writeln!(out, "{} {} @ {}", bar.date.format("%Y-%m-%d"), label, format_number(bar.close));
    }
    out
}

/// Last `rows` bars: close, averages, signal, both portfolio values and drawdown
pub fn render_signal_table(result: &BacktestResult, rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>6} {:>14} {:>14} {:>9}",
        "Date", "Close", "Short MA", "Long MA", "Signal", "Strategy", "Buy & Hold", "DD (%)"
    );

    let skip = result.bars.len().saturating_sub(rows);
    for (bar, drawdown) in result.bars.iter().zip(&result.drawdown_curve).skip(skip) {
        let _ = writeln!(
            out,
            "{:<10} {:>10} {:>10} {:>10} {:>6} {:>14} {:>14} {:>9}",
            bar.date.format("%Y-%m-%d"),
            format_number(bar.close),
            format_optional(bar.short_avg),
            format_optional(bar.long_avg),
            bar.signal.value(),
            format_currency(bar.strategy_value),
            format_currency(bar.buy_hold_value),
            format_number(*drawdown)
        );
    }
    out
}

pub fn print_report(result: &BacktestResult) {
    print!("{}", render_header(&result.config));
    println!();
    print!("{}", render_metrics(&result.metrics));
    println!();
    print!("{}", render_crossovers(result));
    if !result.warnings.is_empty() {
        println!();
        for warning in &result.warnings {
            println!("Note: {}", warning);
        }
    }
}
