//! TTL response cache with in-flight request coalescing.
//!
//! # Invariants
//! - Expired entries are evicted only when read; there is no sweeper.
//! - At most one in-flight operation exists per key.
//! - A producer is invoked lazily, at most once per registration.
//! - An in-flight registration is removed when its operation settles, on
//!   success and on failure alike.

use crate::cache::clock::{duration_ms, Clock, SystemClock};
use crate::logging::log_value;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// Default entry lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Failure of an underlying fetch.
///
/// `Clone` so one coalesced failure reaches every waiter unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response.
    Transport(String),
    /// The server answered with a non-success status.
    Status(u16),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Status(code) => write!(f, "request failed with status {code}"),
        }
    }
}

impl Error for FetchError {}

pub type FetchResult<T> = Result<T, FetchError>;

/// Pending result shared by every caller of one key.
pub type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

/// Cache tuning supplied by the composing application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// One cached response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Store time in Unix epoch milliseconds.
    pub timestamp_ms: i64,
    pub etag: Option<String>,
}

/// Snapshot returned by [`ApiCache::get_cache_stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
    /// Cached keys, sorted.
    pub keys: Vec<String>,
}

struct CacheState<T> {
    entries: HashMap<String, CacheEntry<T>>,
    in_flight: HashMap<String, SharedFetch<T>>,
}

impl<T> Default for CacheState<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }
}

/// Response cache owned by the composing application.
///
/// Cloning yields another handle to the same state.
pub struct ApiCache<T> {
    state: Arc<Mutex<CacheState<T>>>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
}

impl<T> Clone for ApiCache<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<T> std::fmt::Debug for ApiCache<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = lock_state(&self.state);
        f.debug_struct("ApiCache")
            .field("entries", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .field("config", &self.config)
            .finish()
    }
}

fn lock_state<T>(state: &Mutex<CacheState<T>>) -> MutexGuard<'_, CacheState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Default for ApiCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ApiCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a cache on the system clock with default config.
    pub fn new() -> Self {
        Self::with_clock(CacheConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            clock,
            config,
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    fn state(&self) -> MutexGuard<'_, CacheState<T>> {
        lock_state(&self.state)
    }

    /// Returns cached data younger than or exactly `ttl`.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get_cached(&self, key: &str, ttl: Duration) -> Option<T> {
        let now = self.clock.now_ms();
        let mut state = self.state();
        let age = now.saturating_sub(state.entries.get(key)?.timestamp_ms);
        if age <= duration_ms(ttl) {
            debug!(
                "event=cache_hit module=cache key={} age_ms={age}",
                log_value(key)
            );
            return state.entries.get(key).map(|entry| entry.data.clone());
        }
        state.entries.remove(key);
        debug!(
            "event=cache_evict module=cache key={} age_ms={age}",
            log_value(key)
        );
        None
    }

    /// [`Self::get_cached`] with the configured default TTL.
    pub fn get(&self, key: &str) -> Option<T> {
        self.get_cached(key, self.config.default_ttl)
    }

    /// Stores `data` under `key`, replacing any entry and resetting its age.
    pub fn set_cache(&self, key: impl Into<String>, data: T, etag: Option<String>) {
        let entry = CacheEntry {
            data,
            timestamp_ms: self.clock.now_ms(),
            etag,
        };
        self.state().entries.insert(key.into(), entry);
    }

    /// Raw entry for `key` without any age check or eviction.
    pub fn peek(&self, key: &str) -> Option<CacheEntry<T>> {
        self.state().entries.get(key).cloned()
    }

    /// Stored ETag for `key`, regardless of entry age.
    pub fn etag(&self, key: &str) -> Option<String> {
        self.state()
            .entries
            .get(key)
            .and_then(|entry| entry.etag.clone())
    }

    /// Clears every entry, or every key that starts with or contains
    /// `prefix`. Returns the number of removed entries.
    pub fn invalidate_cache(&self, prefix: Option<&str>) -> usize {
        let mut state = self.state();
        let before = state.entries.len();
        match prefix {
            None => state.entries.clear(),
            Some(prefix) => state
                .entries
                .retain(|key, _| !(key.starts_with(prefix) || key.contains(prefix))),
        }
        let removed = before - state.entries.len();
        debug!(
            "event=cache_invalidate module=cache prefix={} removed={removed}",
            log_value(prefix.unwrap_or("*"))
        );
        removed
    }

    /// Joins the pending operation for `key`, or registers `producer` as it.
    ///
    /// Lookup and registration happen under one lock, and `producer` is only
    /// invoked on the first poll of the shared result. Every caller racing
    /// for `key`, on any thread, observes one producer call and its identical
    /// result.
    pub fn deduplicate_request<F, Fut>(
        &self,
        key: impl Into<String>,
        producer: F,
    ) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = FetchResult<T>> + Send + 'static,
    {
        let key = key.into();
        let mut state = self.state();
        if let Some(pending) = state.in_flight.get(&key) {
            debug!("event=request_coalesced module=cache key={}", log_value(&key));
            return pending.clone();
        }

        let operation = async move { producer().await };
        let pending = settle_and_release(Arc::downgrade(&self.state), key.clone(), operation);
        state.in_flight.insert(key.clone(), pending.clone());
        debug!("event=request_start module=cache key={}", log_value(&key));
        pending
    }

    /// Reads `key`; on miss runs a coalesced fetch and stores a success.
    pub async fn fetch_cached<F, Fut>(
        &self,
        key: impl Into<String>,
        ttl: Duration,
        producer: F,
    ) -> FetchResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = FetchResult<T>> + Send + 'static,
    {
        let key = key.into();
        if let Some(hit) = self.get_cached(&key, ttl) {
            return Ok(hit);
        }
        debug!("event=cache_miss module=cache key={}", log_value(&key));
        let result = self.deduplicate_request(key.clone(), producer).await;
        if let Ok(data) = &result {
            self.set_cache(key, data.clone(), None);
        }
        result
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        let state = self.state();
        let mut keys = state.entries.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        CacheStats {
            entries: state.entries.len(),
            in_flight: state.in_flight.len(),
            keys,
        }
    }
}

fn settle_and_release<T, Fut>(
    state: Weak<Mutex<CacheState<T>>>,
    key: String,
    operation: Fut,
) -> SharedFetch<T>
where
    T: Clone + Send + Sync + 'static,
    Fut: Future<Output = FetchResult<T>> + Send + 'static,
{
    async move {
        let result = operation.await;
        if let Some(state) = state.upgrade() {
            lock_state(&state).in_flight.remove(&key);
        }
        debug!(
            "event=request_settle module=cache key={} status={}",
            log_value(&key),
            if result.is_ok() { "ok" } else { "error" }
        );
        result
    }
    .boxed()
    .shared()
}
