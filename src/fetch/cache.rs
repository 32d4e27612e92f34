//! Per-run, per-URL price cache with single-flight loading
//!
//! Every distinct URL maps to one `OnceCell`. Concurrent lookups for the same
//! URL await the same cell, so a page is fetched and extracted at most once
//! even when several events share it. Failed or timed-out fetches are cached
//! as an empty tier set; they are not retried within the run.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::PageFetcher;
use crate::extract::extract_prices;
use crate::model::PriceTierSet;
use crate::tiers::tier_map;

/// Cache statistics for monitoring
#[derive(Debug, Default)]
pub struct CacheStats {
    pub lookups: AtomicU64,
    pub fetches: AtomicU64,
    pub failures: AtomicU64,
}

impl CacheStats {
    pub fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// (lookups, fetches, failures)
    pub fn snapshot(&self) -> (u64, u64, u64) {
        (
            self.lookups.load(Ordering::Relaxed),
            self.fetches.load(Ordering::Relaxed),
            self.failures.load(Ordering::Relaxed),
        )
    }
}

/// URL → price tiers, filled at most once per URL
#[derive(Default)]
pub struct PriceCache {
    entries: DashMap<String, Arc<OnceCell<PriceTierSet>>>,
    stats: CacheStats,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiers for `url`, fetching and extracting on first use
    pub async fn get_or_fetch(
        &self,
        url: &str,
        fetcher: &dyn PageFetcher,
        budget: Duration,
    ) -> PriceTierSet {
        self.stats.record_lookup();

        // Clone the cell out so no map guard is held across the await
        let cell = self
            .entries
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        if let Some(tiers) = cell.get() {
            debug!("Price cache hit for {}", url);
            return *tiers;
        }

        *cell
            .get_or_init(|| self.load(url, fetcher, budget))
            .await
    }

    async fn load(&self, url: &str, fetcher: &dyn PageFetcher, budget: Duration) -> PriceTierSet {
        self.stats.record_fetch();

        match tokio::time::timeout(budget, fetcher.fetch(url)).await {
            Ok(Ok(html)) => {
                let samples = extract_prices(&html);
                let tiers = tier_map(&samples);
                debug!("{}: {} price samples", url, samples.len());
                tiers
            }
            Ok(Err(e)) => {
                warn!("No price data for {}: {}", url, e);
                self.stats.record_failure();
                PriceTierSet::empty()
            }
            Err(_) => {
                warn!("No price data for {}: timed out after {:?}", url, budget);
                self.stats.record_failure();
                PriceTierSet::empty()
            }
        }
    }

    /// Cached tiers without fetching
    pub fn peek(&self, url: &str) -> Option<PriceTierSet> {
        self.entries.get(url).and_then(|cell| cell.get().copied())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FakeFetcher;

    const PAGE: &str = r#"<script type="application/ld+json">
        {"@type":"Event","offers":[{"lowPrice":40,"highPrice":160}]}
    </script>"#;

    #[tokio::test]
    async fn test_repeat_lookup_fetches_once() {
        let fetcher = FakeFetcher::new().page("https://t.example/e/1", PAGE);
        let cache = PriceCache::new();
        let budget = Duration::from_secs(5);

        let first = cache.get_or_fetch("https://t.example/e/1", &fetcher, budget).await;
        let second = cache.get_or_fetch("https://t.example/e/1", &fetcher, budget).await;

        assert_eq!(first, second);
        assert_eq!(first.upper, Some(40.0));
        assert_eq!(first.vip, Some(160.0));
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.stats().snapshot(), (2, 1, 0));
    }

    #[tokio::test]
    async fn test_concurrent_lookups_single_flight() {
        let fetcher = FakeFetcher::new()
            .page("https://t.example/e/1", PAGE)
            .with_delay(Duration::from_millis(50));
        let cache = PriceCache::new();
        let budget = Duration::from_secs(5);

        let lookups = (0..8).map(|_| cache.get_or_fetch("https://t.example/e/1", &fetcher, budget));
        let results = futures::future::join_all(lookups).await;

        assert!(results.iter().all(|t| t.vip == Some(160.0)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_cached_as_empty() {
        let fetcher = FakeFetcher::new().status("https://t.example/gone", 404);
        let cache = PriceCache::new();
        let budget = Duration::from_secs(5);

        assert!(cache.get_or_fetch("https://t.example/gone", &fetcher, budget).await.is_empty());
        assert!(cache.get_or_fetch("https://t.example/gone", &fetcher, budget).await.is_empty());
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.peek("https://t.example/gone"), Some(PriceTierSet::empty()));
    }

    #[tokio::test]
    async fn test_timeout_degrades_only_that_url() {
        let fetcher = FakeFetcher::new()
            .hang("https://t.example/slow")
            .page("https://t.example/fast", PAGE);
        let cache = PriceCache::new();
        let budget = Duration::from_millis(50);

        let (slow, fast) = tokio::join!(
            cache.get_or_fetch("https://t.example/slow", &fetcher, budget),
            cache.get_or_fetch("https://t.example/fast", &fetcher, budget),
        );

        assert!(slow.is_empty());
        assert_eq!(fast.upper, Some(40.0));
        assert_eq!(cache.stats().snapshot().2, 1);
    }
}
