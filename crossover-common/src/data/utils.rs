// =================================================================
// data/utils.rs - Date Utilities
// =================================================================

use super::DataError;
use chrono::{Duration, NaiveDate};

/// Average calendar year length used to annualize returns
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Default backtest lookback when no start date is given
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365 * 5;

/// Elapsed years between two dates, counted in whole calendar days
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}

/// Default `(start, end)` window ending at `end`
pub fn default_date_range(end: NaiveDate) -> (NaiveDate, NaiveDate) {
    (end - Duration::days(DEFAULT_LOOKBACK_DAYS), end)
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, DataError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| DataError::InvalidDate(format!("'{}': {}", value, e)))
}
