pub mod backtest;
pub mod config;
pub mod market_data;
pub mod report;
