//! Command-line interface parsing for the movers CLI
//!
//! Handles parsing of CLI arguments using clap, including the --compare flag
//! for opening the two-symbol comparison view directly and --days for the
//! historical lookback window.

use clap::Parser;
use thiserror::Error;

/// Default historical lookback window in days
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Longest ticker symbol accepted from the command line
const MAX_SYMBOL_LEN: usize = 10;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The given symbol is not a plausible ticker
    #[error("Invalid symbol: '{0}'. Symbols are 1-10 characters: letters, digits, '.' or '-'")]
    InvalidSymbol(String),
}

/// Movers CLI - View US stock market movers and compare symbol performance
#[derive(Parser, Debug)]
#[command(name = "movers")]
#[command(about = "US stock market movers and two-symbol performance comparison")]
#[command(version)]
pub struct Cli {
    /// Open directly in compare mode with two ticker symbols
    ///
    /// Examples:
    ///   movers --compare AAPL MSFT
    ///   movers --compare BRK-B SPY --days 90
    #[arg(long, num_args = 2, value_names = ["SYMBOL_A", "SYMBOL_B"])]
    pub compare: Option<Vec<String>>,

    /// Lookback window in days for historical series
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_DAYS, value_name = "DAYS",
          value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Symbols to compare immediately on startup, if given
    pub compare: Option<(String, String)>,
    /// Historical lookback window in days
    pub days: u32,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            compare: None,
            days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

/// Validates and normalizes a ticker symbol argument
///
/// Symbols are upper-cased; letters, digits, '.' and '-' are accepted
/// (BRK.B and BRK-B styles both appear in provider data).
pub fn parse_symbol_arg(s: &str) -> Result<String, CliError> {
    let symbol = s.trim().to_uppercase();
    let valid_chars = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !valid_chars {
        return Err(CliError::InvalidSymbol(s.to_string()));
    }
    Ok(symbol)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated, upper-cased symbols
    /// * `Err(CliError)` if a symbol fails validation
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let compare = match &cli.compare {
            None => None,
            Some(symbols) => {
                // clap's num_args = 2 guarantees exactly two values
                let a = parse_symbol_arg(&symbols[0])?;
                let b = parse_symbol_arg(&symbols[1])?;
                Some((a, b))
            }
        };

        Ok(StartupConfig {
            compare,
            days: cli.days,
        })
    }
}
