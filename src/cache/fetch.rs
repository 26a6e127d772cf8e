//! Cache-fronted fetching with stale-on-error fallback
//!
//! Wraps an upstream fetch in a `TtlCache` lookup so that, within the
//! freshness window, repeated reads look idempotent to the caller, and a
//! provider outage degrades to the last known value instead of an error.

use std::future::Future;
use std::time::Duration;

use super::store::TtlCache;

/// A value returned through the cache layer, tagged with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    /// The payload
    pub value: T,
    /// Whether the value came from the cache rather than a live fetch
    pub from_cache: bool,
    /// Whether the cached value had already expired when it was served
    /// (stale fallback after a failed fetch)
    pub stale: bool,
}

/// Looks up `key`, falling back to `fetch` and then to stale cache data
///
/// 1. A fresh cache entry is returned immediately, tagged `from_cache`.
/// 2. On a miss (or expired entry), `fetch` runs; its result is validated by
///    the fetch itself, stored under `key` with `ttl`, and returned.
/// 3. If `fetch` fails and any prior value exists under `key` — even one
///    whose TTL has elapsed — that value is returned tagged `from_cache` and
///    `stale`. Only when there is no prior value does the error propagate.
///
/// Two callers racing on the same key can both observe a miss and both hit
/// the upstream; the later `set` wins. Per-key single-flight coalescing is a
/// possible enhancement for callers that need it, not something this function
/// provides.
pub async fn get_or_fetch<T, E, F, Fut>(
    cache: &TtlCache<T>,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<Fetched<T>, E>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(peeked) = cache.peek(key) {
        if !peeked.is_expired {
            return Ok(Fetched {
                value: peeked.value,
                from_cache: true,
                stale: false,
            });
        }
    }

    match fetch().await {
        Ok(value) => {
            cache.set(key, value.clone(), ttl);
            Ok(Fetched {
                value,
                from_cache: false,
                stale: false,
            })
        }
        Err(err) => match cache.peek(key) {
            Some(peeked) => Ok(Fetched {
                value: peeked.value,
                from_cache: true,
                stale: true,
            }),
            None => Err(err),
        },
    }
}
