//! Market movers client for the Financial Modeling Prep API
//!
//! Fetches the day's top gainers and losers concurrently and truncates each
//! list to the top 10 in provider order.

use chrono::Utc;
use futures::future;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Mover, MoverBoard};

/// Base URL for the Financial Modeling Prep v3 API
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Maximum number of movers kept per list
const TOP_MOVERS: usize = 10;

/// Errors that can occur when fetching market movers
#[derive(Debug, Error)]
pub enum MoversError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Response body was not an array of mover records
    #[error("Failed to parse movers response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A raw mover record as returned by the provider
#[derive(Debug, Deserialize)]
struct RawMover {
    symbol: String,
    name: String,
    price: f64,
    change: f64,
    #[serde(rename = "changesPercentage")]
    changes_percentage: f64,
}

impl From<RawMover> for Mover {
    fn from(raw: RawMover) -> Self {
        Mover {
            symbol: raw.symbol,
            name: raw.name,
            price: raw.price,
            change: raw.change,
            changes_percentage: raw.changes_percentage,
        }
    }
}

/// Client for fetching the market movers board
#[derive(Debug, Clone)]
pub struct MoversClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MoversClient {
    /// Creates a new MoversClient with the given provider API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: FMP_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Creates a new MoversClient with a custom base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches the current movers board
    ///
    /// Gainers and losers are requested concurrently, mirroring how the
    /// provider exposes them as two independent endpoints. Each list is
    /// truncated to the top 10 without re-sorting; the provider's order is
    /// authoritative.
    ///
    /// # Returns
    /// * `Ok(MoverBoard)` - Both lists, at most 10 entries each
    /// * `Err(MoversError)` - If either request or body fails to validate
    pub async fn fetch_movers(&self) -> Result<MoverBoard, MoversError> {
        let gainers_url = format!("{}/stock_market/gainers?apikey={}", self.base_url, self.api_key);
        let losers_url = format!("{}/stock_market/losers?apikey={}", self.base_url, self.api_key);

        let (gainers, losers) = future::join(
            self.fetch_list(&gainers_url),
            self.fetch_list(&losers_url),
        )
        .await;

        Ok(MoverBoard {
            top_gainers: top_ten(gainers?),
            top_losers: top_ten(losers?),
            fetched_at: Utc::now(),
        })
    }

    /// Fetches and validates one movers list
    async fn fetch_list(&self, url: &str) -> Result<Vec<Mover>, MoversError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;
        parse_list(&text)
    }
}

/// Parses a provider body into mover records
///
/// The body must be a JSON array; the provider signals errors (bad API key,
/// rate limit) with a JSON object instead, which fails validation here.
fn parse_list(text: &str) -> Result<Vec<Mover>, MoversError> {
    let raw: Vec<RawMover> = serde_json::from_str(text)?;
    Ok(raw.into_iter().map(Mover::from).collect())
}

/// Truncates a movers list to the top 10, preserving provider order
fn top_ten(mut movers: Vec<Mover>) -> Vec<Mover> {
    movers.truncate(TOP_MOVERS);
    movers
}
