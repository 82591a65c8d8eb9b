// =================================================================
// market_data/csv_source.rs - Local CSV Source
// =================================================================

use async_trait::async_trait;
use crossover_common::data::{load_bars_from_path, DataError, PriceRequest, PriceSeries};
use std::path::PathBuf;
use tracing::info;

use super::{traits::PriceSource, utils::series_for_request};

/// Daily bars from a CSV export on disk. The ticker in the request only
/// labels the series; the file is assumed to hold a single instrument.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PriceSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch_daily_bars(&self, request: &PriceRequest) -> Result<PriceSeries, DataError> {
        let path = self.path.clone();
        let bars = tokio::task::spawn_blocking(move || load_bars_from_path(path))
            .await
            .map_err(|e| DataError::Request(format!("CSV loader task failed: {}", e)))??;

        let series = series_for_request(request, bars)?;
        info!(
            "Loaded {} bars for {} from {}",
            series.len(),
            series.ticker(),
            self.path.display()
        );
        Ok(series)
    }
}
