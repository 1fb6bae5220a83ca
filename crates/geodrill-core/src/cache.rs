//! Memoizing cache in front of a [`GeoDataProvider`]
//!
//! Entries are keyed by `(kind, parent)` and evicted least-recently-used once
//! the capacity is reached. Nothing is ever invalidated explicitly.
//!
//! Provider failures go through a second, independent [`FailurePolicy`]: when
//! it fires the failure is re-raised as [`CacheError::FetchFailed`], otherwise
//! it is swallowed and the kind's fallback value is returned and stored like
//! any other result. Re-raised failures are never stored, so the next call
//! retries the provider.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::CacheError;
use crate::failure::{FailurePolicy, RandomFailure};
use crate::provider::{DetailRecord, GeoDataProvider, GeoValue};
use crate::tier::FetchKind;

/// Default number of memoized lookups
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Default probability that a provider failure is re-raised
pub const DEFAULT_RETHROW_RATE: f64 = 0.10;

/// Cache key: lookup kind plus its parent (always `None` for continents)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: FetchKind,
    pub parent: Option<String>,
}

impl CacheKey {
    pub fn new(kind: FetchKind, parent: Option<&str>) -> Self {
        let parent = if kind.takes_parent() {
            parent.filter(|p| !p.is_empty()).map(str::to_string)
        } else {
            None
        };
        Self { kind, parent }
    }
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Provider failures swallowed into a fallback value
    pub fallbacks: u64,
    /// Provider failures re-raised to the caller
    pub failures: u64,
    pub entries: usize,
    pub capacity: usize,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fallbacks: AtomicU64,
    failures: AtomicU64,
}

pub struct GeoCache {
    provider: Arc<dyn GeoDataProvider>,
    rethrow: Arc<dyn FailurePolicy>,
    entries: Mutex<LruCache<CacheKey, GeoValue>>,
    counters: Counters,
}

impl GeoCache {
    /// Cache with the default capacity and a 10% re-raise rate
    pub fn new(provider: Arc<dyn GeoDataProvider>) -> Self {
        Self {
            provider,
            rethrow: Arc::new(RandomFailure::new(DEFAULT_RETHROW_RATE)),
            entries: Mutex::new(LruCache::new(capacity_of(DEFAULT_CACHE_CAPACITY))),
            counters: Counters::default(),
        }
    }

    /// Set the capacity (values below 1 are treated as 1)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.entries.get_mut().resize(capacity_of(capacity));
        self
    }

    /// Policy deciding whether a provider failure is re-raised
    pub fn with_rethrow_policy(mut self, policy: Arc<dyn FailurePolicy>) -> Self {
        self.rethrow = policy;
        self
    }

    /// Resolve `(kind, parent)`, consulting the provider only on a miss
    pub async fn fetch(
        &self,
        kind: FetchKind,
        parent: Option<&str>,
    ) -> Result<GeoValue, CacheError> {
        let key = CacheKey::new(kind, parent);

        let cached = self.entries.lock().get(&key).cloned();
        if let Some(value) = cached {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(kind = %kind, parent = ?key.parent, "cache hit");
            return Ok(value);
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(kind = %kind, parent = ?key.parent, "cache miss");

        let value = match self.provider.fetch(kind, key.parent.as_deref()).await {
            Ok(value) => value,
            Err(cause) => {
                if self.rethrow.should_fail(kind) {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        kind = %kind,
                        parent = ?key.parent,
                        error = %cause,
                        "re-raising provider failure"
                    );
                    return Err(CacheError::FetchFailed { kind, cause });
                }
                self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    kind = %kind,
                    parent = ?key.parent,
                    error = %cause,
                    "provider failure swallowed, using fallback"
                );
                GeoValue::fallback(kind)
            }
        };

        self.entries.lock().put(key, value.clone());
        Ok(value)
    }

    /// Resolve a list lookup
    pub async fn names(
        &self,
        kind: FetchKind,
        parent: Option<&str>,
    ) -> Result<Vec<String>, CacheError> {
        Ok(self.fetch(kind, parent).await?.into_names())
    }

    /// Resolve a detail lookup
    pub async fn detail(
        &self,
        kind: FetchKind,
        parent: Option<&str>,
    ) -> Result<DetailRecord, CacheError> {
        Ok(self.fetch(kind, parent).await?.into_detail())
    }

    /// Whether a value is stored for the key (does not touch recency)
    pub fn contains(&self, kind: FetchKind, parent: Option<&str>) -> bool {
        self.entries.lock().contains(&CacheKey::new(kind, parent))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let (entries, capacity) = {
            let guard = self.entries.lock();
            (guard.len(), guard.cap().get())
        };
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            entries,
            capacity,
        }
    }
}

fn capacity_of(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{InstantClock, LatencyProfile};
    use crate::failure::{AlwaysFail, FailOnly, NeverFail, ScriptedFailure};
    use crate::provider::{CountingProvider, MockGeoProvider};

    type Counting = CountingProvider<MockGeoProvider<InstantClock>>;

    fn counting(failures: Arc<dyn FailurePolicy>) -> Arc<Counting> {
        let provider = MockGeoProvider::with_clock(Arc::new(InstantClock::new()))
            .with_latency(LatencyProfile::none())
            .with_failures(failures);
        Arc::new(CountingProvider::new(provider))
    }

    #[tokio::test]
    async fn test_repeat_fetch_hits_cache() {
        let provider = counting(Arc::new(NeverFail));
        let cache = GeoCache::new(provider.clone()).with_rethrow_policy(Arc::new(NeverFail));

        let first = cache.fetch(FetchKind::Countries, Some("Europe")).await.unwrap();
        let second = cache.fetch(FetchKind::Countries, Some("Europe")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.calls(FetchKind::Countries), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_continents_ignore_parent() {
        let provider = counting(Arc::new(NeverFail));
        let cache = GeoCache::new(provider.clone());
        cache.fetch(FetchKind::Continents, None).await.unwrap();
        cache.fetch(FetchKind::Continents, Some("ignored")).await.unwrap();
        assert_eq!(provider.calls(FetchKind::Continents), 1);
        assert!(cache.contains(FetchKind::Continents, None));
    }

    #[tokio::test]
    async fn test_swallowed_failure_returns_and_stores_fallback() {
        let failures = FailOnly::new([FetchKind::Cities, FetchKind::Continents]);
        let provider = counting(Arc::new(failures));
        let cache = GeoCache::new(provider.clone()).with_rethrow_policy(Arc::new(NeverFail));

        let cities = cache.names(FetchKind::Cities, Some("Ontario")).await.unwrap();
        assert!(cities.is_empty());
        let continents = cache.names(FetchKind::Continents, None).await.unwrap();
        assert_eq!(continents.len(), 6);

        // Fallbacks are memoized like real results
        cache.names(FetchKind::Cities, Some("Ontario")).await.unwrap();
        assert_eq!(provider.calls(FetchKind::Cities), 1);
        assert_eq!(cache.stats().fallbacks, 2);
    }

    #[tokio::test]
    async fn test_detail_fallback_is_empty_record() {
        let provider = counting(Arc::new(AlwaysFail));
        let cache = GeoCache::new(provider).with_rethrow_policy(Arc::new(NeverFail));
        let record = cache.detail(FetchKind::CityData, Some("London")).await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn test_rethrown_failure_is_not_cached() {
        let provider = counting(Arc::new(ScriptedFailure::new([true])));
        let cache = GeoCache::new(provider.clone()).with_rethrow_policy(Arc::new(AlwaysFail));

        let err = cache.fetch(FetchKind::States, Some("UK")).await.unwrap_err();
        let CacheError::FetchFailed { kind, cause } = err;
        assert_eq!(kind, FetchKind::States);
        assert_eq!(cause.parent(), Some("UK"));
        assert!(!cache.contains(FetchKind::States, Some("UK")));

        // The scripted provider failure is used up; the retry succeeds
        let states = cache.names(FetchKind::States, Some("UK")).await.unwrap();
        assert_eq!(states.len(), 4);
        assert_eq!(provider.calls(FetchKind::States), 2);
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let provider = counting(Arc::new(NeverFail));
        let cache = GeoCache::new(provider.clone()).with_capacity(2);
        assert_eq!(cache.capacity(), 2);

        cache.fetch(FetchKind::Countries, Some("Europe")).await.unwrap();
        cache.fetch(FetchKind::Countries, Some("Asia")).await.unwrap();
        // Touch Europe so Asia becomes least recently used
        cache.fetch(FetchKind::Countries, Some("Europe")).await.unwrap();
        cache.fetch(FetchKind::Countries, Some("Africa")).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(FetchKind::Countries, Some("Europe")));
        assert!(!cache.contains(FetchKind::Countries, Some("Asia")));

        cache.fetch(FetchKind::Countries, Some("Asia")).await.unwrap();
        assert_eq!(provider.calls(FetchKind::Countries), 4);
    }

    #[test]
    fn test_blocking_fetch_outcomes() {
        let cache = GeoCache::new(counting(Arc::new(FailOnly::new([FetchKind::StateData]))))
            .with_rethrow_policy(Arc::new(AlwaysFail));

        tokio_test::block_on(async {
            tokio_test::assert_ok!(cache.fetch(FetchKind::CountryData, Some("Canada")).await);
            tokio_test::assert_err!(cache.fetch(FetchKind::StateData, Some("Ontario")).await);
        });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let cache = GeoCache::new(counting(Arc::new(NeverFail))).with_capacity(0);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.is_empty());
    }
}
