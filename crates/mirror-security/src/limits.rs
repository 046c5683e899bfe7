//! Request throttling.
//!
//! Every client gets two token buckets: one shared by all routes and a
//! stricter one for search. A bucket holds `limit` tokens and refills at
//! `limit` tokens per window.
//!
//! Buckets live in a [`BucketStore`] between requests. Spin runs each request
//! in a fresh component instance, so the deployed API keeps them in key-value
//! storage; [`MemoryBucketStore`] serves native builds and tests. Timestamps
//! are wall-clock milliseconds, so a bucket written by one instance can be
//! refilled by the next.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use mirror_core::ThrottleConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Most buckets a [`MemoryBucketStore`] holds by default.
pub const MAX_TRACKED_BUCKETS: usize = 10_000;

/// Errors from limit configuration, exhaustion or bucket storage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LimitsError {
    #[error("invalid limit configuration: {0}")]
    InvalidLimit(String),

    #[error("rate limit exceeded for {scope}; retry in {retry_after_secs}s")]
    RateLimitExceeded {
        scope: ThrottleScope,
        retry_after_secs: u64,
    },

    #[error("bucket store error: {0}")]
    Store(String),
}

/// Which limit a request counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleScope {
    /// Every route.
    Global,
    /// The search route, on top of the global limit.
    Search,
}

impl fmt::Display for ThrottleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThrottleScope::Global => "global",
            ThrottleScope::Search => "search",
        })
    }
}

/// Stored token bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketState {
    pub tokens: f64,
    /// Unix milliseconds of the last refill.
    pub updated_at_ms: u64,
}

impl BucketState {
    /// JSON encoding used by key-value storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LimitsError> {
        serde_json::to_vec(self).map_err(|e| LimitsError::Store(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LimitsError> {
        serde_json::from_slice(bytes).map_err(|e| LimitsError::Store(e.to_string()))
    }
}

/// Token bucket parameters: `capacity` tokens, refilled over `window`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    capacity: f64,
    window_ms: f64,
}

impl RateLimit {
    /// `limit` requests per `window`, all of which may arrive at once.
    pub fn per_window(limit: u32, window: Duration) -> Result<Self, LimitsError> {
        if limit == 0 {
            return Err(LimitsError::InvalidLimit("limit cannot be 0".into()));
        }
        if window.is_zero() {
            return Err(LimitsError::InvalidLimit("window cannot be 0".into()));
        }
        Ok(Self {
            capacity: f64::from(limit),
            window_ms: window.as_secs_f64() * 1000.0,
        })
    }

    /// Bucket contents at `now_ms`. A missing bucket starts full.
    pub fn refill(&self, stored: Option<BucketState>, now_ms: u64) -> BucketState {
        match stored {
            None => BucketState {
                tokens: self.capacity,
                updated_at_ms: now_ms,
            },
            Some(bucket) => {
                let elapsed_ms = now_ms.saturating_sub(bucket.updated_at_ms) as f64;
                BucketState {
                    tokens: (bucket.tokens + elapsed_ms * self.capacity / self.window_ms)
                        .min(self.capacity),
                    updated_at_ms: now_ms.max(bucket.updated_at_ms),
                }
            }
        }
    }

    /// Take one token at `now_ms`. Returns the updated bucket and, on
    /// exhaustion, how long until a token is available.
    pub fn acquire(
        &self,
        stored: Option<BucketState>,
        now_ms: u64,
    ) -> (BucketState, Result<(), Duration>) {
        let mut bucket = self.refill(stored, now_ms);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return (bucket, Ok(()));
        }
        let missing = 1.0 - bucket.tokens;
        let wait = Duration::from_secs_f64(missing * self.window_ms / self.capacity / 1000.0);
        (bucket, Err(wait))
    }
}

/// Where buckets live between requests.
pub trait BucketStore {
    fn load(&self, key: &str) -> Result<Option<BucketState>, LimitsError>;

    fn save(&self, key: &str, bucket: &BucketState) -> Result<(), LimitsError>;
}

impl<S: BucketStore + ?Sized> BucketStore for Arc<S> {
    fn load(&self, key: &str) -> Result<Option<BucketState>, LimitsError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, bucket: &BucketState) -> Result<(), LimitsError> {
        (**self).save(key, bucket)
    }
}

/// In-process buckets, capped at a fixed number of keys.
///
/// When full, the least recently updated tenth of the buckets is dropped
/// before a new key is added.
#[derive(Debug)]
pub struct MemoryBucketStore {
    capacity: usize,
    buckets: Mutex<HashMap<String, BucketState>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TRACKED_BUCKETS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Number of buckets currently held.
    pub fn len(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBucketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketStore for MemoryBucketStore {
    fn load(&self, key: &str) -> Result<Option<BucketState>, LimitsError> {
        let buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        Ok(buckets.get(key).copied())
    }

    fn save(&self, key: &str, bucket: &BucketState) -> Result<(), LimitsError> {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        if buckets.len() >= self.capacity && !buckets.contains_key(key) {
            evict_oldest(&mut buckets, self.capacity);
        }
        buckets.insert(key.to_string(), *bucket);
        Ok(())
    }
}

fn evict_oldest(buckets: &mut HashMap<String, BucketState>, capacity: usize) {
    let keep = capacity - capacity.div_ceil(10);
    let mut by_age: Vec<(u64, String)> = buckets
        .iter()
        .map(|(key, bucket)| (bucket.updated_at_ms, key.clone()))
        .collect();
    by_age.sort_unstable();

    let evicted = by_age.len().saturating_sub(keep);
    for (_, key) in by_age.into_iter().take(evicted) {
        buckets.remove(&key);
    }
    debug!(evicted, "evicted idle throttle buckets");
}

/// Per-client request throttle.
pub struct Throttle {
    global: RateLimit,
    search: RateLimit,
    store: Box<dyn BucketStore>,
}

impl fmt::Debug for Throttle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttle")
            .field("global", &self.global)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl Throttle {
    /// Throttle keeping its buckets in memory.
    pub fn new(window: Duration, limit: u32, search_limit: u32) -> Result<Self, LimitsError> {
        Self::with_store(window, limit, search_limit, Box::new(MemoryBucketStore::new()))
    }

    pub fn with_store(
        window: Duration,
        limit: u32,
        search_limit: u32,
        store: Box<dyn BucketStore>,
    ) -> Result<Self, LimitsError> {
        Ok(Self {
            global: RateLimit::per_window(limit, window)?,
            search: RateLimit::per_window(search_limit, window)?,
            store,
        })
    }

    pub fn from_config(config: &ThrottleConfig) -> Result<Self, LimitsError> {
        Self::from_config_with_store(config, Box::new(MemoryBucketStore::new()))
    }

    pub fn from_config_with_store(
        config: &ThrottleConfig,
        store: Box<dyn BucketStore>,
    ) -> Result<Self, LimitsError> {
        Self::with_store(
            Duration::from_secs(config.ttl_secs),
            config.limit,
            config.search_limit,
            store,
        )
    }

    /// Count a request from `client`.
    pub fn check(&self, client: &str, scope: ThrottleScope) -> Result<(), LimitsError> {
        self.check_at(client, scope, unix_millis())
    }

    /// Count a request from `client` at `now_ms` (Unix milliseconds).
    /// Search requests also count against the global limit.
    ///
    /// A bucket that cannot be read starts full, and a failed write is only
    /// logged; storage trouble never rejects a request.
    pub fn check_at(
        &self,
        client: &str,
        scope: ThrottleScope,
        now_ms: u64,
    ) -> Result<(), LimitsError> {
        self.acquire(&self.global, ThrottleScope::Global, client, now_ms)?;
        if scope == ThrottleScope::Search {
            self.acquire(&self.search, ThrottleScope::Search, client, now_ms)?;
        }
        Ok(())
    }

    fn acquire(
        &self,
        limit: &RateLimit,
        scope: ThrottleScope,
        client: &str,
        now_ms: u64,
    ) -> Result<(), LimitsError> {
        let key = bucket_key(scope, client);
        let stored = self.store.load(&key).unwrap_or_else(|e| {
            warn!(error = %e, key = %key, "throttle bucket unreadable");
            None
        });

        let (bucket, outcome) = limit.acquire(stored, now_ms);
        if let Err(e) = self.store.save(&key, &bucket) {
            warn!(error = %e, key = %key, "failed to save throttle bucket");
        }
        outcome.map_err(|wait| exceeded(client, scope, wait))
    }
}

/// Storage key for a client's bucket, e.g. `throttle:search:203.0.113.7`.
pub fn bucket_key(scope: ThrottleScope, client: &str) -> String {
    format!("throttle:{scope}:{client}")
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn exceeded(client: &str, scope: ThrottleScope, wait: Duration) -> LimitsError {
    let retry_after_secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    debug!(client, %scope, retry_after_secs, "request throttled");
    LimitsError::RateLimitExceeded {
        scope,
        retry_after_secs: retry_after_secs.max(1),
    }
}
