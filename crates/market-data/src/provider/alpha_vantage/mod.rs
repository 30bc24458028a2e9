//! Alpha Vantage market data provider implementation.
//!
//! Daily series come from the TIME_SERIES_DAILY_ADJUSTED endpoint and carry
//! adjusted close, dividend, and split data. Intraday series come from
//! TIME_SERIES_INTRADAY and do not; those fields are filled with `None` so
//! the row shape stays uniform.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{parse_price, FetchMode, ProviderBar, Sampling};
use crate::provider::MarketDataProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Registry name of this provider, also used for the persisted
/// data-source row.
pub const PROVIDER_ALPHA_VANTAGE: &str = "AlphaVantage";

const DEFAULT_INTRADAY_INTERVAL: &str = "5min";

/// Alpha Vantage market data provider.
#[derive(Debug)]
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    interval: String,
}

// ============================================================================
// Response structures for the Alpha Vantage API
// ============================================================================

/// TIME_SERIES_DAILY_ADJUSTED response.
#[derive(Debug, Deserialize)]
struct DailyAdjustedResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyAdjustedBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyAdjustedBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. adjusted close")]
    adjusted_close: String,
    #[serde(rename = "6. volume")]
    volume: String,
    #[serde(rename = "7. dividend amount")]
    dividend_amount: String,
    #[serde(rename = "8. split coefficient")]
    split_coefficient: String,
}

/// TIME_SERIES_INTRADAY bar. The enclosing time-series key is dynamic
/// ("Time Series (5min)" etc.), so the envelope is located by key scan.
#[derive(Debug, Deserialize)]
struct IntradayBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            interval: DEFAULT_INTRADAY_INTERVAL.to_string(),
        }
    }

    /// Override the intraday sampling interval (default 5min).
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(BASE_URL, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                }
            } else {
                MarketDataError::Network(e)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ALPHA_VANTAGE.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response.text().await.map_err(MarketDataError::Network)
    }

    /// Check for API-level errors in the response envelope.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                message: msg.clone(),
            });
        }

        // "Note" usually indicates rate limiting
        if let Some(msg) = note {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                });
            }
            warn!("Alpha Vantage note: {}", msg);
        }

        if let Some(msg) = information {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                });
            }
            warn!("Alpha Vantage info: {}", msg);
        }

        Ok(())
    }

    fn outputsize(mode: FetchMode) -> &'static str {
        match mode {
            FetchMode::Seed => "full",
            FetchMode::Incremental => "compact",
        }
    }

    /// Parse a TIME_SERIES_DAILY_ADJUSTED payload into ordered bars.
    fn parse_daily_response(symbol: &str, text: &str) -> Result<Vec<ProviderBar>, MarketDataError> {
        let response: DailyAdjustedResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let time_series = response.time_series.ok_or_else(|| {
            MarketDataError::SymbolNotFound(format!("No data for symbol: {}", symbol))
        })?;

        let mut bars: Vec<ProviderBar> = time_series
            .into_iter()
            .filter_map(|(date_str, bar)| {
                let timestamp = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                    .ok()?
                    .and_hms_opt(0, 0, 0)?;
                Some(ProviderBar {
                    timestamp,
                    open: parse_price(&bar.open),
                    high: parse_price(&bar.high),
                    low: parse_price(&bar.low),
                    close: parse_price(&bar.close),
                    adjusted_close: parse_price(&bar.adjusted_close),
                    volume: parse_price(&bar.volume),
                    dividend_amount: parse_price(&bar.dividend_amount),
                    split_coefficient: parse_price(&bar.split_coefficient),
                })
            })
            .collect();

        bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(bars)
    }

    /// Parse a TIME_SERIES_INTRADAY payload into ordered bars.
    ///
    /// The time-series key embeds the interval, so the envelope is scanned
    /// for the first key containing "Time Series".
    fn parse_intraday_response(
        symbol: &str,
        text: &str,
    ) -> Result<Vec<ProviderBar>, MarketDataError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        let as_string = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        Self::check_api_error(
            &as_string("Error Message"),
            &as_string("Note"),
            &as_string("Information"),
        )?;

        let series_value = value
            .as_object()
            .and_then(|obj| {
                obj.iter()
                    .find(|(key, _)| key.contains("Time Series"))
                    .map(|(_, v)| v.clone())
            })
            .ok_or_else(|| {
                MarketDataError::SymbolNotFound(format!("No data for symbol: {}", symbol))
            })?;

        let time_series: HashMap<String, IntradayBar> = serde_json::from_value(series_value)
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ALPHA_VANTAGE.to_string(),
                message: format!("Unexpected time series shape: {}", e),
            })?;

        let mut bars: Vec<ProviderBar> = time_series
            .into_iter()
            .filter_map(|(ts_str, bar)| {
                let timestamp =
                    NaiveDateTime::parse_from_str(&ts_str, "%Y-%m-%d %H:%M:%S").ok()?;
                Some(ProviderBar {
                    timestamp,
                    open: parse_price(&bar.open),
                    high: parse_price(&bar.high),
                    low: parse_price(&bar.low),
                    close: parse_price(&bar.close),
                    // Not available for intraday sampling; carried as
                    // explicit nulls so the row shape stays uniform.
                    adjusted_close: None,
                    volume: parse_price(&bar.volume),
                    dividend_amount: None,
                    split_coefficient: None,
                })
            })
            .collect();

        bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ALPHA_VANTAGE
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        mode: FetchMode,
        sampling: Sampling,
    ) -> Result<Vec<ProviderBar>, MarketDataError> {
        let outputsize = Self::outputsize(mode);

        let bars = match sampling {
            Sampling::Daily => {
                let params = [
                    ("function", "TIME_SERIES_DAILY_ADJUSTED"),
                    ("symbol", symbol),
                    ("outputsize", outputsize),
                ];
                let text = self.fetch(&params).await?;
                Self::parse_daily_response(symbol, &text)?
            }
            Sampling::Intraday => {
                let params = [
                    ("function", "TIME_SERIES_INTRADAY"),
                    ("symbol", symbol),
                    ("interval", self.interval.as_str()),
                    ("outputsize", outputsize),
                ];
                let text = self.fetch(&params).await?;
                Self::parse_intraday_response(symbol, &text)?
            }
        };

        debug!(
            "Alpha Vantage: fetched {} bars for {} ({:?}/{:?})",
            bars.len(),
            symbol,
            mode,
            sampling
        );

        Ok(bars)
    }
}
