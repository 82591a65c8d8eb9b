// =================================================================
// market_data/memory.rs - Preloaded Bars
// =================================================================

use async_trait::async_trait;
use crossover_common::data::{Bar, DataError, PriceRequest, PriceSeries};

use super::{traits::PriceSource, utils::series_for_request};

/// Serves a fixed set of bars, e.g. synthetic or previously loaded data
#[derive(Debug, Clone)]
pub struct InMemorySource {
    bars: Vec<Bar>,
}

impl InMemorySource {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }
}

#[async_trait]
impl PriceSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_daily_bars(&self, request: &PriceRequest) -> Result<PriceSeries, DataError> {
        series_for_request(request, self.bars.clone())
    }
}
