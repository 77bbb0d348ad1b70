//! API response cache and request coalescer.
//!
//! # Responsibility
//! - Memoize fetched responses per normalized request key with a TTL.
//! - Collapse concurrent fetches of one key into a single operation.
//!
//! # Invariants
//! - The same semantic query always yields the same key.
//! - Cache misses are control flow, not errors.
//! - A failed fetch is never replayed; the next call starts fresh.

mod clock;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{build_cache_key, QueryParams};
pub use store::{
    ApiCache, CacheConfig, CacheEntry, CacheStats, FetchError, FetchResult, SharedFetch,
    DEFAULT_CACHE_TTL,
};
