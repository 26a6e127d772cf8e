//! Historical price client for the Financial Modeling Prep API
//!
//! Fetches per-symbol daily closing prices and normalizes the provider
//! records into a clean, chronologically sorted series. The provider emits
//! `close` as a JSON number most of the time but occasionally as a string,
//! so coercion happens here and records that fail it are discarded.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::PricePoint;

/// Base URL for the Financial Modeling Prep v3 API
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Errors that can occur when fetching historical prices
#[derive(Debug, Error)]
pub enum HistoricalError {
    /// No symbol was provided; surfaced before any network call
    #[error("symbol is required")]
    MissingSymbol,

    /// HTTP request failed or returned a non-success status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Response body did not contain the expected `historical` array
    #[error("Failed to parse historical response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Every record in the window was discarded during validation
    #[error("no valid historical data for {0}")]
    NoData(String),
}

/// Provider response wrapper around the historical array
#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    historical: Vec<RawBar>,
}

/// A raw daily bar as returned by the provider, newest first
#[derive(Debug, Deserialize)]
struct RawBar {
    /// ISO 8601 calendar date
    date: String,
    /// Closing price, number or string depending on the provider's mood
    close: Value,
}

/// Client for fetching historical daily closes
#[derive(Debug, Clone)]
pub struct HistoricalClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HistoricalClient {
    /// Creates a new HistoricalClient with the given provider API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: FMP_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Creates a new HistoricalClient with a custom base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches up to `days` daily closes for `symbol`, oldest first
    ///
    /// # Arguments
    /// * `symbol` - Ticker symbol; a blank symbol is rejected immediately
    /// * `days` - Lookback window in days
    ///
    /// # Returns
    /// * `Ok(Vec<PricePoint>)` - Validated series sorted ascending by date
    /// * `Err(HistoricalError)` - Missing symbol, transport failure, or a
    ///   body that yields no usable records
    pub async fn fetch_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, HistoricalError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(HistoricalError::MissingSymbol);
        }

        let url = format!(
            "{}/historical-price-full/{}?timeseries={}&apikey={}",
            self.base_url, symbol, days, self.api_key
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        parse_history(&text, symbol, days)
    }
}

/// Parses and validates a provider body into a sorted price series
///
/// Records are capped to the newest `days` entries (the provider sends newest
/// first), then each record must carry a parseable date and a close that
/// coerces to a finite number; the rest are dropped. The survivors are sorted
/// ascending by date. An empty result is an error, not an empty series.
fn parse_history(
    text: &str,
    symbol: &str,
    days: u32,
) -> Result<Vec<PricePoint>, HistoricalError> {
    let response: HistoricalResponse = serde_json::from_str(text)?;

    let mut points: Vec<PricePoint> = response
        .historical
        .into_iter()
        .take(days as usize)
        .filter_map(|bar| {
            let date = NaiveDate::parse_from_str(&bar.date, "%Y-%m-%d").ok()?;
            let close = coerce_close(&bar.close)?;
            Some(PricePoint { date, close })
        })
        .collect();

    if points.is_empty() {
        return Err(HistoricalError::NoData(symbol.to_string()));
    }

    points.sort_by_key(|point| point.date);
    Ok(points)
}

/// Coerces a JSON close value to a finite f64
fn coerce_close(value: &Value) -> Option<f64> {
    let close = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    close.is_finite().then_some(close)
}
