// market_data/traits.rs

use async_trait::async_trait;
use crossover_common::data::{DataError, PriceRequest, PriceSeries};

/// Daily price history provider.
///
/// Implementations return bars inside `[start_date, end_date)` in ascending
/// date order, or an error when nothing usable comes back.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    async fn fetch_daily_bars(&self, request: &PriceRequest) -> Result<PriceSeries, DataError>;
}
