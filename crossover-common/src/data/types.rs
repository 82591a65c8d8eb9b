// =================================================================
// data/types.rs - Price Data Structures
// =================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for market data retrieval and validation
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No data returned for {0}")]
    Empty(String),

    #[error("Bars out of order: {previous} is not before {next}")]
    OutOfOrder { previous: NaiveDate, next: NaiveDate },

    #[error("Invalid close {close} on {date}")]
    InvalidClose { date: NaiveDate, close: f64 },

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Provider error [{code}]: {description}")]
    Provider { code: String, description: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

/// One trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

impl Bar {
    /// Create a close-only bar
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }

    pub fn with_ohlc(mut self, open: f64, high: f64, low: f64) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Parameters for requesting a daily price history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PriceRequest {
    pub fn new(ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            start_date,
            end_date,
        }
    }

    /// Whether `date` falls inside the half-open range `[start_date, end_date)`
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date < self.end_date
    }
}

/// Ordered daily bars for one ticker.
///
/// Construction enforces the series invariant every downstream stage relies
/// on: at least one bar, dates strictly increasing, closes positive and finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataError> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(DataError::Empty(ticker));
        }

        for bar in &bars {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(DataError::InvalidClose {
                    date: bar.date,
                    close: bar.close,
                });
            }
        }

        for pair in bars.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(DataError::OutOfOrder {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        Ok(Self { ticker, bars })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_series_accepts_ordered_bars() {
        let series = PriceSeries::new(
            "SPY",
            vec![Bar::new(day(2), 100.0), Bar::new(day(3), 101.0), Bar::new(day(5), 99.5)],
        )
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), day(2));
        assert_eq!(series.last_date(), day(5));
        assert_eq!(series.closes(), vec![100.0, 101.0, 99.5]);
    }

    #[test]
    fn test_series_rejects_empty() {
        let err = PriceSeries::new("SPY", Vec::new()).unwrap_err();
        assert!(matches!(err, DataError::Empty(ref t) if t == "SPY"));
    }

    #[test]
    fn test_series_rejects_duplicate_and_descending_dates() {
        let dup = PriceSeries::new("SPY", vec![Bar::new(day(2), 1.0), Bar::new(day(2), 2.0)]);
        assert!(matches!(dup, Err(DataError::OutOfOrder { .. })));

        let desc = PriceSeries::new("SPY", vec![Bar::new(day(3), 1.0), Bar::new(day(2), 2.0)]);
        assert!(matches!(desc, Err(DataError::OutOfOrder { .. })));
    }

    #[test]
    fn test_series_rejects_bad_close() {
        for close in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let res = PriceSeries::new("SPY", vec![Bar::new(day(2), close)]);
            assert!(matches!(res, Err(DataError::InvalidClose { .. })));
        }
    }

    #[test]
    fn test_request_normalizes_ticker() {
        let req = PriceRequest::new(" spy ", day(1), day(10));
        assert_eq!(req.ticker, "SPY");
        assert!(req.contains(day(1)));
        assert!(req.contains(day(9)));
        assert!(!req.contains(day(10)));
    }
}
