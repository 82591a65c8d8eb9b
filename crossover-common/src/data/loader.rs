// =================================================================
// data/loader.rs - CSV Bar Loader
// =================================================================

use super::{Bar, DataError};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Daily price row as exported by Yahoo Finance and most charting tools.
/// Unparseable numeric fields (e.g. `null`) become `None`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(default, alias = "Open", deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(default, alias = "High", deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(default, alias = "Low", deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(default, alias = "Volume", deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

/// Read bars from any CSV source. Rows without a close are skipped.
pub fn load_bars_from_reader<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.map_err(|e| DataError::ParseError(format!("row {}: {}", idx + 1, e)))?;

        let Some(close) = row.close else {
            debug!("Skipping row {} ({}): missing close", idx + 1, row.date);
            skipped += 1;
            continue;
        };

        bars.push(Bar {
            date: row.date,
            close,
            open: row.open,
            high: row.high,
            low: row.low,
            volume: row.volume,
        });
    }

    if skipped > 0 {
        debug!("Skipped {} rows without a close price", skipped);
    }

    Ok(bars)
}

/// Read bars from a CSV file on disk
pub fn load_bars_from_path(path: impl AsRef<Path>) -> Result<Vec<Bar>, DataError> {
    let path = path.as_ref();
    info!("Loading price data from: {}", path.display());
    let file = std::fs::File::open(path)?;
    load_bars_from_reader(file)
}
