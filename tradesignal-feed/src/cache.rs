//! In-memory TTL cache in front of any candle provider.
//!
//! Candles from the same `(pair, timeframe, limit)` request are reused until
//! the entry is older than the TTL. Errors are never cached.

use crate::provider::{CandleProvider, FeedError, Timeframe};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tradesignal_core::Candle;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

type CacheKey = (String, Timeframe, usize);

#[derive(Debug)]
struct CacheEntry {
    fetched_at: Instant,
    candles: Vec<Candle>,
}

pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<P: CandleProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl(inner: P) -> Self {
        Self::new(inner, DEFAULT_TTL)
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every cached entry.
    pub fn invalidate(&self) {
        self.entries().clear();
    }

    /// Drop the entries of one pair, across timeframes and limits.
    pub fn invalidate_pair(&self, pair: &str) {
        self.entries().retain(|(p, _, _), _| p != pair);
    }

    /// Number of live entries. Expired entries are pruned first.
    pub fn len(&self) -> usize {
        let ttl = self.ttl;
        let mut entries = self.entries();
        entries.retain(|_, e| e.fetched_at.elapsed() < ttl);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: CandleProvider> CandleProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, FeedError> {
        let key = (pair.to_string(), timeframe, limit);

        if let Some(entry) = self.entries().get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                tracing::debug!(pair, %timeframe, "cache hit");
                return Ok(entry.candles.clone());
            }
        }

        // Fetch outside the lock so slow requests for different pairs
        // do not serialize behind each other.
        tracing::debug!(pair, %timeframe, provider = self.inner.name(), "cache miss");
        let candles = self.inner.fetch(pair, timeframe, limit)?;
        self.entries().insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                candles: candles.clone(),
            },
        );
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts upstream calls; fails for pairs starting with "BAD".
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CandleProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn fetch(
            &self,
            pair: &str,
            _timeframe: Timeframe,
            limit: usize,
        ) -> Result<Vec<Candle>, FeedError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if pair.starts_with("BAD") {
                return Err(FeedError::SymbolNotFound {
                    symbol: pair.to_string(),
                });
            }
            let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let price = 100.0 + n as f64;
            Ok(vec![Candle::new(ts, price, price, price, price, 1.0); limit])
        }
    }

    #[test]
    fn second_fetch_within_ttl_is_served_from_cache() {
        let cache = CachedProvider::new(CountingProvider::new(), Duration::from_secs(60));
        let a = cache.fetch("BTC/USDT", Timeframe::H4, 3).unwrap();
        let b = cache.fetch("BTC/USDT", Timeframe::H4, 3).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.inner().calls(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.name(), "counting");
    }

    #[test]
    fn key_includes_timeframe_and_limit() {
        let cache = CachedProvider::new(CountingProvider::new(), Duration::from_secs(60));
        cache.fetch("BTC/USDT", Timeframe::H4, 3).unwrap();
        cache.fetch("BTC/USDT", Timeframe::H1, 3).unwrap();
        cache.fetch("BTC/USDT", Timeframe::H4, 5).unwrap();
        cache.fetch("ETH/USDT", Timeframe::H4, 3).unwrap();
        assert_eq!(cache.inner().calls(), 4);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn expired_entries_are_refetched() {
        let cache = CachedProvider::new(CountingProvider::new(), Duration::from_millis(10));
        let a = cache.fetch("BTC/USDT", Timeframe::H4, 1).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.is_empty());
        let b = cache.fetch("BTC/USDT", Timeframe::H4, 1).unwrap();
        assert_eq!(cache.inner().calls(), 2);
        assert_ne!(a[0].close, b[0].close);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = CachedProvider::with_default_ttl(CountingProvider::new());
        assert!(cache.fetch("BAD/USDT", Timeframe::H4, 1).is_err());
        assert!(cache.fetch("BAD/USDT", Timeframe::H4, 1).is_err());
        assert_eq!(cache.inner().calls(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_forces_refetch() {
        let cache = CachedProvider::with_default_ttl(CountingProvider::new());
        cache.fetch("BTC/USDT", Timeframe::H4, 1).unwrap();
        cache.fetch("ETH/USDT", Timeframe::H4, 1).unwrap();

        cache.invalidate_pair("BTC/USDT");
        assert_eq!(cache.len(), 1);

        cache.invalidate();
        assert!(cache.is_empty());
        cache.fetch("ETH/USDT", Timeframe::H4, 1).unwrap();
        assert_eq!(cache.inner().calls(), 3);
    }

    #[test]
    fn shared_across_threads() {
        let cache = CachedProvider::with_default_ttl(CountingProvider::new());
        cache.fetch("BTC/USDT", Timeframe::H4, 2).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| cache.fetch("BTC/USDT", Timeframe::H4, 2).unwrap());
            }
        });
        assert_eq!(cache.inner().calls(), 1);
    }
}
