pub mod accounting;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod signal;
pub mod types;

pub use accounting::ReturnAccountant;
pub use engine::{run_backtest, BacktestEngine};
pub use errors::BacktestError;
pub use metrics::{drawdown_curve, MetricsCalculator};
pub use signal::{sma, SignalEngine};
pub use types::{
    AnnotatedBar, BacktestConfig, BacktestResult, BacktestWarning, Crossover, Metrics,
    ReturnSeries, Signal, SignalBar,
};
