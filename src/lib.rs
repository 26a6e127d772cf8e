//! Movers CLI Library
//!
//! This module exposes the application's modules for use in integration
//! tests: the caching layer, the provider clients, the series aligner, and
//! the CLI/TUI plumbing around them.

pub mod app;
pub mod cache;
pub mod cli;
pub mod compare;
pub mod data;
pub mod refresh;
pub mod ui;
