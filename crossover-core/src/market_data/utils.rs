// =================================================================
// market_data/utils.rs - Utility Functions
// =================================================================

use super::types::ChartData;
use chrono::{DateTime, NaiveDate, NaiveTime};
use crossover_common::data::{Bar, DataError, PriceRequest, PriceSeries};
use tracing::debug;

/// Validate ticker format (e.g. `SPY`, `BRK-B`, `^GSPC`, `EURUSD=X`)
pub fn validate_ticker(ticker: &str) -> Result<String, DataError> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(DataError::InvalidSymbol("Ticker cannot be empty".to_string()));
    }

    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(DataError::InvalidSymbol(format!(
            "Ticker '{}' contains invalid characters",
            ticker
        )));
    }

    if ticker.len() > 20 {
        return Err(DataError::InvalidSymbol(format!(
            "Ticker '{}' has invalid length",
            ticker
        )));
    }

    Ok(ticker)
}

/// Midnight UTC of `date` as a unix timestamp
pub fn date_to_unix(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Convert a chart payload to daily bars.
///
/// With `prefer_adjusted` the adjusted close replaces the raw close whenever
/// the payload carries an adjusted series. Days without a close are dropped.
pub fn convert_chart_to_bars(data: &ChartData, prefer_adjusted: bool) -> Result<Vec<Bar>, DataError> {
    let quote = data
        .indicators
        .quote
        .first()
        .ok_or_else(|| DataError::ParseError("Chart has no quote data".to_string()))?;

    let adjusted = if prefer_adjusted {
        data.indicators.adjclose.as_ref().and_then(|a| a.first())
    } else {
        None
    };

    let field = |values: &[Option<f64>], idx: usize| values.get(idx).copied().flatten();

    let mut bars: Vec<Bar> = Vec::with_capacity(data.timestamp.len());
    for (idx, &ts) in data.timestamp.iter().enumerate() {
        // Session dates are in exchange time
        let date = DateTime::from_timestamp(ts + data.meta.gmtoffset, 0)
            .ok_or_else(|| DataError::ParseError(format!("Invalid timestamp {}", ts)))?
            .date_naive();

        let close = match adjusted {
            Some(adj) => field(&adj.adjclose[..], idx),
            None => field(&quote.close[..], idx),
        };
        let Some(close) = close else {
            debug!("Skipping {}: no close", date);
            continue;
        };

        let bar = Bar {
            date,
            close,
            open: field(&quote.open[..], idx),
            high: field(&quote.high[..], idx),
            low: field(&quote.low[..], idx),
            volume: field(&quote.volume[..], idx),
        };

        // Intraday snapshots can repeat the last session's date; keep the latest
        match bars.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => bars.push(bar),
        }
    }

    Ok(bars)
}

/// Keep the bars inside the request range and build a validated series
pub fn series_for_request(request: &PriceRequest, bars: Vec<Bar>) -> Result<PriceSeries, DataError> {
    let total = bars.len();
    let in_range: Vec<Bar> = bars.into_iter().filter(|b| request.contains(b.date)).collect();
    if in_range.len() < total {
        debug!(
            "Dropped {} of {} bars outside {}..{}",
            total - in_range.len(),
            total,
            request.start_date,
            request.end_date
        );
    }
    PriceSeries::new(request.ticker.clone(), in_range)
}
