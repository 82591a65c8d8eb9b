use crossover_common::data::DataError;
use thiserror::Error;

/// Backtest error types
#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration error: {0}")]
    Config(String),
}
