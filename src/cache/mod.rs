//! Caching layer for provider responses
//!
//! This module provides an in-memory TTL cache plus the `get_or_fetch`
//! combinator that fronts every upstream read: fresh entries short-circuit
//! the network call, misses fetch and store, and failed fetches degrade to
//! the last known value flagged as stale.

mod fetch;
mod store;

pub use fetch::{get_or_fetch, Fetched};
pub use store::{Clock, ManualClock, Peeked, SystemClock, TtlCache};
