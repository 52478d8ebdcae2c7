//! # Reader Cache
//!
//! Time-based caching of the last native sample taken by a reader.
//!
//! A reader asked for data within its TTL answers from the cache without
//! touching hardware. The cache is cheap to clone; clones share the same slot,
//! which lets an in-flight fetch task write back into the reader it came from.
//!
//! ```rust
//! use std::time::Duration;
//! use tonic_telemetry::resource::ReaderCache;
//!
//! let cache = ReaderCache::new(Duration::from_secs(60));
//! cache.store(42u64);
//! assert_eq!(cache.fresh().map(|(value, _)| value), Some(42));
//! ```
use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use tokio::time::Instant;

/// Cached value with the instant it was captured
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    captured_at: Instant,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(value: T, captured_at: Instant, ttl: Duration) -> Self {
        Self { value, captured_at, expires_at: captured_at + ttl }
    }

    /// An entry is expired once its full TTL has elapsed
    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Single-slot TTL cache shared between a reader and its fetch tasks
#[derive(Debug)]
pub struct ReaderCache<T> {
    ttl: Duration,
    entry: Arc<RwLock<Option<CacheEntry<T>>>>,
}

impl<T> Clone for ReaderCache<T> {
    fn clone(&self) -> Self {
        Self { ttl: self.ttl, entry: Arc::clone(&self.entry) }
    }
}

impl<T: Clone> ReaderCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: Arc::new(RwLock::new(None)) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value and its capture instant, if still within TTL
    pub fn fresh(&self) -> Option<(T, Instant)> {
        self.fresh_at(Instant::now())
    }

    pub fn fresh_at(&self, now: Instant) -> Option<(T, Instant)> {
        let guard = self.entry.read();
        guard
            .as_ref()
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| (entry.value.clone(), entry.captured_at))
    }

    /// Replaces the cached value, returning the capture instant
    pub fn store(&self, value: T) -> Instant {
        self.store_at(value, Instant::now())
    }

    pub fn store_at(&self, value: T, captured_at: Instant) -> Instant {
        *self.entry.write() = Some(CacheEntry::new(value, captured_at, self.ttl));
        captured_at
    }

    /// The last value captured regardless of expiry
    pub fn last_value(&self) -> Option<T> {
        self.entry.read().as_ref().map(|entry| entry.value.clone())
    }

    /// When the last value was captured
    pub fn last_fetch(&self) -> Option<Instant> {
        self.entry.read().as_ref().map(|entry| entry.captured_at)
    }

    pub fn invalidate(&self) {
        *self.entry.write() = None;
    }
}
