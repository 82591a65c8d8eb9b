// =================================================================
// market_data/yahoo.rs - Yahoo Finance Chart Source
// =================================================================

use async_trait::async_trait;
use crossover_common::data::{DataError, PriceRequest, PriceSeries};
use reqwest::{header::CONTENT_TYPE, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{
    traits::PriceSource,
    types::ChartResponse,
    utils::{convert_chart_to_bars, date_to_unix, series_for_request, validate_ticker},
};

// Constants
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(2);
const MAX_ATTEMPTS: u32 = 3;

fn request_error(err: reqwest::Error) -> DataError {
    if err.is_timeout() {
        DataError::Request(format!("Request timed out: {}", err))
    } else if err.is_connect() {
        DataError::Request(format!("Network error: {}", err))
    } else {
        DataError::Request(err.to_string())
    }
}

/// Daily bars from the Yahoo Finance chart API
pub struct YahooSource {
    base_url: String,
    prefer_adjusted: bool,
    client: reqwest::Client,
}

impl YahooSource {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, DataError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(request_error)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            prefer_adjusted: true,
            client,
        })
    }

    /// Use raw closes instead of split/dividend adjusted closes
    pub fn with_adjusted_close(mut self, prefer_adjusted: bool) -> Self {
        self.prefer_adjusted = prefer_adjusted;
        self
    }

    fn build_url(&self, ticker: &str, request: &PriceRequest) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            ticker,
            date_to_unix(request.start_date),
            date_to_unix(request.end_date)
        )
    }

    /// Parse a chart API body into a validated series
    pub fn parse_response(&self, body: &str, request: &PriceRequest) -> Result<PriceSeries, DataError> {
        let response: ChartResponse = serde_json::from_str(body)?;

        if let Some(error) = response.chart.error {
            return Err(DataError::Provider {
                code: error.code,
                description: error.description,
            });
        }

        let data = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| DataError::Empty(request.ticker.clone()))?;

        let bars = convert_chart_to_bars(&data, self.prefer_adjusted)?;
        series_for_request(request, bars)
    }

    async fn fetch_body(&self, url: &str) -> Result<String, DataError> {
        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.contains("json"));
        let body = response.text().await.map_err(request_error)?;

        check_response(status, is_json, body)
    }
}

/// Rate limits and server errors are retryable request errors. Chart errors
/// come back as JSON with a 4xx status and are left to the parser.
fn check_response(status: StatusCode, is_json: bool, body: String) -> Result<String, DataError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(DataError::Request(format!("Rate limited by Yahoo (HTTP {})", status)));
    }
    if status.is_server_error() {
        return Err(DataError::Request(format!("HTTP {}", status)));
    }
    if status.is_client_error() && !is_json {
        let snippet: String = body.trim().chars().take(120).collect();
        return Err(DataError::Request(format!("HTTP {}: {}", status, snippet)));
    }
    Ok(body)
}

#[async_trait]
impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_daily_bars(&self, request: &PriceRequest) -> Result<PriceSeries, DataError> {
        let ticker = validate_ticker(&request.ticker)?;
        let url = self.build_url(&ticker, request);
        debug!("Requesting {}", url);

        let mut attempt = 0;
        let body = loop {
            attempt += 1;
            match self.fetch_body(&url).await {
                Ok(body) => break body,
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!(
                        "Chart request for {} failed (attempt {}/{}): {}",
                        ticker, attempt, MAX_ATTEMPTS, e
                    );
                    sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e),
            }
        };

        let series = self.parse_response(&body, request)?;
        info!(
            "Received {} bars for {} ({} to {})",
            series.len(),
            series.ticker(),
            series.first_date(),
            series.last_date()
        );
        Ok(series)
    }
}
