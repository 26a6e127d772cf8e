//! UI rendering module for the movers CLI
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod compare_chart;
pub mod help_overlay;
pub mod movers_board;

pub use compare_chart::render as render_compare_chart;
pub use help_overlay::render as render_help_overlay;
pub use movers_board::render as render_movers_board;
