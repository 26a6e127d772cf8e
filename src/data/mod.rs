//! Core data models for the movers CLI
//!
//! This module contains the data types shared across the application for
//! representing market movers and historical price series, plus the clients
//! that fetch them from the Financial Modeling Prep API.

pub mod historical;
pub mod movers;

pub use historical::{HistoricalClient, HistoricalError};
pub use movers::{MoversClient, MoversError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Environment variable holding the Financial Modeling Prep API key
pub const API_KEY_ENV: &str = "FMP_API_KEY";

/// Reads the provider API key from the environment
///
/// Returns an empty string when unset; requests then fail upstream with an
/// authorization error, which flows through the normal fallback path.
pub fn api_key_from_env() -> String {
    std::env::var(API_KEY_ENV).unwrap_or_default()
}

/// A single traded symbol ranked by magnitude of price change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Last traded price in USD
    pub price: f64,
    /// Absolute price change over the period
    pub change: f64,
    /// Percentage price change over the period
    pub changes_percentage: f64,
}

/// Snapshot of the market movers board: top gainers and top losers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverBoard {
    /// Top gainers, at most 10, in provider order
    pub top_gainers: Vec<Mover>,
    /// Top losers, at most 10, in provider order
    pub top_losers: Vec<Mover>,
    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

/// A daily closing price for one symbol
///
/// Invariant: `close` is always a finite number; provider records whose close
/// fails numeric coercion are discarded at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day
    pub date: NaiveDate,
    /// Closing price in USD
    pub close: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mover_serialization_roundtrip() {
        let mover = Mover {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            price: 231.5,
            change: 4.2,
            changes_percentage: 1.85,
        };

        let json = serde_json::to_string(&mover).expect("Failed to serialize Mover");
        let deserialized: Mover = serde_json::from_str(&json).expect("Failed to deserialize Mover");

        assert_eq!(deserialized, mover);
    }

    #[test]
    fn test_mover_board_serialization_roundtrip() {
        let board = MoverBoard {
            top_gainers: vec![Mover {
                symbol: "NVDA".to_string(),
                name: "NVIDIA Corporation".to_string(),
                price: 131.2,
                change: 6.1,
                changes_percentage: 4.88,
            }],
            top_losers: vec![],
            fetched_at: Utc::now(),
        };

        let json = serde_json::to_string(&board).expect("Failed to serialize MoverBoard");
        let deserialized: MoverBoard =
            serde_json::from_str(&json).expect("Failed to deserialize MoverBoard");

        assert_eq!(deserialized.top_gainers, board.top_gainers);
        assert!(deserialized.top_losers.is_empty());
    }

    #[test]
    fn test_price_point_serialization_roundtrip() {
        let point = PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            close: 182.4,
        };

        let json = serde_json::to_string(&point).expect("Failed to serialize PricePoint");
        let deserialized: PricePoint =
            serde_json::from_str(&json).expect("Failed to deserialize PricePoint");

        assert_eq!(deserialized, point);
    }
}
