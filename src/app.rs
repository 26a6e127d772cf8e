//! Application state management for the movers CLI
//!
//! Contains the main application state, keyboard handling, and the data
//! loading paths that route every provider read through the TTL cache with
//! stale fallback. The cache TTLs and the manual-refresh throttle are policy
//! constants owned here, not by the cache itself.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use futures::future;

use crate::cache::{get_or_fetch, Fetched, TtlCache};
use crate::cli::StartupConfig;
use crate::compare::{align_series, AlignedPoint};
use crate::data::{
    api_key_from_env, HistoricalClient, Mover, MoverBoard, MoversClient, PricePoint,
};

/// Freshness window for the movers board
pub const MOVERS_TTL: Duration = Duration::from_secs(60);

/// Freshness window for per-symbol historical series
pub const HISTORY_TTL: Duration = Duration::from_secs(3600);

/// Minimum interval between user-triggered refreshes
///
/// This throttles the 'r' key; it is unrelated to the cache TTLs, which
/// decide freshness, not how often a caller may ask.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Cache key for the movers board
const MOVERS_CACHE_KEY: &str = "movers_board";

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while fetching data
    Loading,
    /// Movers board showing top gainers and losers
    Movers,
    /// Normalized comparison chart for two symbols
    Compare,
}

/// A loaded two-symbol comparison ready for charting
#[derive(Debug, Clone)]
pub struct Comparison {
    /// First symbol (series A)
    pub symbol_a: String,
    /// Second symbol (series B)
    pub symbol_b: String,
    /// Aligned, rebased-to-100 points, ascending by date
    pub points: Vec<AlignedPoint>,
    /// Whether either side was served from an expired cache entry
    pub stale: bool,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Latest movers board, tagged with its cache provenance
    pub board: Option<Fetched<MoverBoard>>,
    /// Index of the selected row across gainers followed by losers
    pub selected_index: usize,
    /// First symbol marked for comparison, awaiting a second pick
    pub pick: Option<String>,
    /// Currently loaded comparison, if any
    pub comparison: Option<Comparison>,
    /// Historical lookback window in days
    pub days: u32,
    /// Status line message (errors, throttle notices)
    pub status: Option<String>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating a manual refresh has been requested
    pub refresh_requested: bool,
    /// Timestamp of the last completed movers load
    pub last_refresh: Option<DateTime<Local>>,
    /// Comparison pair waiting to be loaded by the event loop
    pending_compare: Option<(String, String)>,
    /// When the user last triggered a manual refresh
    last_manual_refresh: Option<Instant>,
    /// Movers API client
    movers_client: MoversClient,
    /// Historical prices API client
    historical_client: HistoricalClient,
    /// Cache for the movers board
    movers_cache: TtlCache<MoverBoard>,
    /// Cache for per-symbol historical series
    history_cache: TtlCache<Vec<PricePoint>>,
}

impl App {
    /// Creates a new App instance with default state
    ///
    /// The provider API key is read from the environment once, here, and
    /// handed to the clients; nothing reads the environment mid-fetch.
    pub fn new() -> Self {
        Self::with_startup_config(StartupConfig::default())
    }

    /// Creates a new App instance with the given startup configuration
    pub fn with_startup_config(config: StartupConfig) -> Self {
        let api_key = api_key_from_env();
        Self::build(
            MoversClient::new(api_key.clone()),
            HistoricalClient::new(api_key),
            config,
        )
    }

    /// Creates a new App instance with custom clients (for testing)
    #[cfg(test)]
    pub fn with_clients(
        movers_client: MoversClient,
        historical_client: HistoricalClient,
        config: StartupConfig,
    ) -> Self {
        Self::build(movers_client, historical_client, config)
    }

    fn build(
        movers_client: MoversClient,
        historical_client: HistoricalClient,
        config: StartupConfig,
    ) -> Self {
        Self {
            state: AppState::Loading,
            board: None,
            selected_index: 0,
            pick: None,
            comparison: None,
            days: config.days,
            status: None,
            should_quit: false,
            show_help: false,
            refresh_requested: false,
            last_refresh: None,
            pending_compare: config.compare,
            last_manual_refresh: None,
            movers_client,
            historical_client,
            movers_cache: TtlCache::new(),
            history_cache: TtlCache::new(),
        }
    }

    /// Returns the board rows in display order: gainers, then losers
    pub fn visible_movers(&self) -> Vec<&Mover> {
        match &self.board {
            Some(board) => board
                .value
                .top_gainers
                .iter()
                .chain(board.value.top_losers.iter())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the number of selectable rows
    pub fn mover_count(&self) -> usize {
        self.visible_movers().len()
    }

    /// Returns the currently selected mover, if any
    pub fn selected_mover(&self) -> Option<&Mover> {
        self.visible_movers().get(self.selected_index).copied()
    }

    /// Loads the movers board through the cache layer
    ///
    /// On failure with no fallback available, keeps the previous board (if
    /// any) and records a status message; the failure never escapes a load
    /// cycle.
    pub async fn load_movers(&mut self) {
        let result = get_or_fetch(&self.movers_cache, MOVERS_CACHE_KEY, MOVERS_TTL, || {
            self.movers_client.fetch_movers()
        })
        .await;

        match result {
            Ok(board) => {
                self.board = Some(board);
                self.status = None;
                self.last_refresh = Some(Local::now());
                let count = self.mover_count();
                if count > 0 {
                    self.selected_index = self.selected_index.min(count - 1);
                } else {
                    self.selected_index = 0;
                }
            }
            Err(err) => {
                self.status = Some(format!("Failed to load movers: {}", err));
            }
        }

        // The initial load lands on the board unless a startup comparison
        // is still pending.
        if self.state == AppState::Loading && self.pending_compare.is_none() {
            self.state = AppState::Movers;
        }
    }

    /// Loads both symbols' histories through the cache layer and aligns them
    pub async fn load_comparison(&mut self, symbol_a: &str, symbol_b: &str) {
        let days = self.days;
        let key_a = history_cache_key(symbol_a, days);
        let key_b = history_cache_key(symbol_b, days);

        let (result_a, result_b) = future::join(
            get_or_fetch(&self.history_cache, &key_a, HISTORY_TTL, || {
                self.historical_client.fetch_history(symbol_a, days)
            }),
            get_or_fetch(&self.history_cache, &key_b, HISTORY_TTL, || {
                self.historical_client.fetch_history(symbol_b, days)
            }),
        )
        .await;

        let (history_a, history_b) = match (result_a, result_b) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(err), _) => {
                self.fail_compare(format!("{}: {}", symbol_a, err));
                return;
            }
            (_, Err(err)) => {
                self.fail_compare(format!("{}: {}", symbol_b, err));
                return;
            }
        };

        match align_series(&history_a.value, &history_b.value) {
            Ok(points) => {
                self.comparison = Some(Comparison {
                    symbol_a: symbol_a.to_string(),
                    symbol_b: symbol_b.to_string(),
                    points,
                    stale: history_a.stale || history_b.stale,
                });
                self.status = None;
                self.state = AppState::Compare;
            }
            Err(err) => {
                self.fail_compare(format!("{} vs {}: {}", symbol_a, symbol_b, err));
            }
        }
    }

    /// Records a comparison failure and falls back to the board view
    fn fail_compare(&mut self, message: String) {
        self.status = Some(message);
        if self.state != AppState::Movers {
            self.state = AppState::Movers;
        }
    }

    /// Takes the comparison pair queued for loading, if any
    pub fn take_pending_compare(&mut self) -> Option<(String, String)> {
        self.pending_compare.take()
    }

    /// Requests a manual refresh, subject to the minimum interval
    pub fn request_refresh(&mut self) {
        self.request_refresh_at(Instant::now());
    }

    /// Throttle-checked refresh request with an injectable instant
    fn request_refresh_at(&mut self, now: Instant) {
        let allowed = self
            .last_manual_refresh
            .map_or(true, |last| now.duration_since(last) >= MIN_REFRESH_INTERVAL);

        if allowed {
            self.last_manual_refresh = Some(now);
            self.refresh_requested = true;
        } else {
            self.status = Some("Refresh throttled; try again in a few seconds".to_string());
        }
    }

    /// Marks the selected symbol for comparison, or queues the pair when a
    /// second distinct symbol is confirmed
    fn toggle_pick(&mut self) {
        let Some(symbol) = self.selected_mover().map(|m| m.symbol.clone()) else {
            return;
        };

        match self.pick.take() {
            None => {
                self.pick = Some(symbol);
            }
            Some(first) if first == symbol => {
                // Re-picking the same symbol unmarks it
                self.status = None;
            }
            Some(first) => {
                self.pending_compare = Some((first, symbol));
            }
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move selection in the board
    /// - `Enter`/`c`: Mark the selected symbol; confirming a second symbol
    ///   opens the comparison chart
    /// - `r`: Refresh the board (throttled)
    /// - `Esc` (in board): Clear the pending mark, else quit
    /// - `Esc` (in compare): Back to the board
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Movers => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    if self.pick.is_some() {
                        self.pick = None;
                    } else {
                        self.should_quit = true;
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected_index = self.selected_index.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let count = self.mover_count();
                    if count > 0 && self.selected_index < count - 1 {
                        self.selected_index += 1;
                    }
                }
                KeyCode::Enter | KeyCode::Char('c') => {
                    self.toggle_pick();
                }
                KeyCode::Char('r') => {
                    self.request_refresh();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::Compare => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.state = AppState::Movers;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the cache key for one symbol's history at a given window
fn history_cache_key(symbol: &str, days: u32) -> String {
    format!("historical_{}_{}d", symbol, days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn test_app() -> App {
        App::with_clients(
            MoversClient::new("test-key"),
            HistoricalClient::new("test-key"),
            StartupConfig::default(),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample_mover(symbol: &str, pct: f64) -> Mover {
        Mover {
            symbol: symbol.to_string(),
            name: format!("{} Inc.", symbol),
            price: 100.0,
            change: pct,
            changes_percentage: pct,
        }
    }

    fn app_with_board(gainers: &[&str], losers: &[&str]) -> App {
        let mut app = test_app();
        app.state = AppState::Movers;
        app.board = Some(Fetched {
            value: MoverBoard {
                top_gainers: gainers.iter().map(|s| sample_mover(s, 5.0)).collect(),
                top_losers: losers.iter().map(|s| sample_mover(s, -5.0)).collect(),
                fetched_at: Utc::now(),
            },
            from_cache: false,
            stale: false,
        });
        app
    }

    #[test]
    fn test_new_app_starts_loading() {
        let app = test_app();
        assert_eq!(app.state, AppState::Loading);
        assert!(app.board.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_startup_compare_is_queued() {
        let mut app = App::with_clients(
            MoversClient::new("k"),
            HistoricalClient::new("k"),
            StartupConfig {
                compare: Some(("AAPL".to_string(), "MSFT".to_string())),
                days: 90,
            },
        );

        assert_eq!(app.days, 90);
        assert_eq!(
            app.take_pending_compare(),
            Some(("AAPL".to_string(), "MSFT".to_string()))
        );
        assert_eq!(app.take_pending_compare(), None, "pair is taken once");
    }

    #[test]
    fn test_visible_movers_orders_gainers_before_losers() {
        let app = app_with_board(&["UP1", "UP2"], &["DN1"]);

        let symbols: Vec<&str> = app.visible_movers().iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, ["UP1", "UP2", "DN1"]);
        assert_eq!(app.mover_count(), 3);
    }

    #[test]
    fn test_quit_from_board() {
        let mut app = app_with_board(&["UP1"], &[]);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_quit_from_loading() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_selection_moves_and_clamps() {
        let mut app = app_with_board(&["UP1", "UP2"], &["DN1"]);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected_index, 2);

        // Clamped at the last row
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected_index, 2);

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_index, 1);

        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_vim_keys_move_selection() {
        let mut app = app_with_board(&["UP1", "UP2"], &[]);

        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.selected_index, 1);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_pick_two_symbols_queues_comparison() {
        let mut app = app_with_board(&["UP1", "UP2"], &[]);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.pick.as_deref(), Some("UP1"));

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(
            app.take_pending_compare(),
            Some(("UP1".to_string(), "UP2".to_string()))
        );
        assert!(app.pick.is_none());
    }

    #[test]
    fn test_picking_same_symbol_twice_unmarks() {
        let mut app = app_with_board(&["UP1"], &[]);

        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.pick.as_deref(), Some("UP1"));

        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.pick.is_none());
        assert_eq!(app.take_pending_compare(), None);
    }

    #[test]
    fn test_esc_clears_pick_before_quitting() {
        let mut app = app_with_board(&["UP1"], &[]);

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Esc));
        assert!(app.pick.is_none());
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_esc_in_compare_returns_to_board() {
        let mut app = app_with_board(&["UP1"], &[]);
        app.state = AppState::Compare;

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Movers);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_help_overlay_intercepts_keys() {
        let mut app = app_with_board(&["UP1"], &[]);

        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.show_help);

        // 'q' closes help instead of quitting while the overlay is up
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_manual_refresh_throttled_within_interval() {
        let mut app = app_with_board(&["UP1"], &[]);
        let start = Instant::now();

        app.request_refresh_at(start);
        assert!(app.refresh_requested);

        app.refresh_requested = false;
        app.request_refresh_at(start + Duration::from_secs(5));
        assert!(!app.refresh_requested, "second request inside 10s is dropped");
        assert!(app.status.is_some());

        app.request_refresh_at(start + MIN_REFRESH_INTERVAL);
        assert!(app.refresh_requested, "request after the interval passes");
    }

    #[test]
    fn test_history_cache_key_includes_window() {
        assert_eq!(history_cache_key("AAPL", 365), "historical_AAPL_365d");
        assert_ne!(history_cache_key("AAPL", 90), history_cache_key("AAPL", 365));
    }

    #[tokio::test]
    async fn test_load_comparison_failure_returns_to_board() {
        // Unroutable endpoints: both fetches fail, nothing cached, so the
        // comparison falls back to the board with a status message.
        let mut app = App::with_clients(
            MoversClient::new("k"),
            HistoricalClient::new("k").with_base_url("http://127.0.0.1:1"),
            StartupConfig::default(),
        );
        app.state = AppState::Compare;

        app.load_comparison("AAPL", "MSFT").await;

        assert_eq!(app.state, AppState::Movers);
        assert!(app.comparison.is_none());
        assert!(app.status.is_some());
    }
}
