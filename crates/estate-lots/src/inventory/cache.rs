use super::criteria::SearchCriteria;
use super::view::LotView;
use crate::config::CacheConfig;
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared, immutable search result.
pub type SearchResult = Arc<[LotView]>;

struct CacheEntry {
    lots: SearchResult,
    stored_at: Instant,
}

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// Bounded LRU memo of search results with time-based expiry.
///
/// Lookups that miss take a per-criteria compute lock before scanning, so concurrent
/// readers of the same criteria wait for one computation instead of repeating it while
/// unrelated criteria proceed independently.
pub struct SearchCache {
    entries: Mutex<LruCache<SearchCriteria, CacheEntry>>,
    inflight: DashMap<SearchCriteria, Arc<Mutex<()>>>,
    ttl: Duration,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SearchCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.size)),
            inflight: DashMap::new(),
            ttl: config.expiration,
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the fresh cached result for `criteria`, or runs `compute` and caches its output.
    pub fn get_or_compute<F>(&self, criteria: &SearchCriteria, compute: F) -> SearchResult
    where
        F: FnOnce() -> Vec<LotView>,
    {
        if let Some(lots) = self.fresh(criteria) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%criteria, "search cache hit");
            return lots;
        }

        let slot = self
            .inflight
            .entry(*criteria)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        let lots = {
            let _compute = slot.lock();
            match self.fresh(criteria) {
                Some(lots) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    lots
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let generation = self.generation.load(Ordering::Acquire);
                    let lots: SearchResult = compute().into();
                    self.store(criteria, Arc::clone(&lots), generation);
                    debug!(%criteria, matches = lots.len(), "search cache miss");
                    lots
                }
            }
        };

        drop(slot);
        self.inflight
            .remove_if(criteria, |_, slot| Arc::strong_count(slot) == 1);

        lots
    }

    /// Drops every cached result. Computations already running will not store theirs.
    pub fn invalidate(&self) {
        let mut entries = self.entries.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
            capacity: entries.cap().get(),
        }
    }

    fn fresh(&self, criteria: &SearchCriteria) -> Option<SearchResult> {
        let mut entries = self.entries.lock();
        let state = entries
            .get(criteria)
            .map(|entry| (entry.stored_at.elapsed() < self.ttl).then(|| Arc::clone(&entry.lots)));

        match state {
            Some(Some(lots)) => Some(lots),
            Some(None) => {
                entries.pop(criteria);
                None
            }
            None => None,
        }
    }

    fn store(&self, criteria: &SearchCriteria, lots: SearchResult, generation: u64) {
        let mut entries = self.entries.lock();
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(%criteria, "search result computed before invalidation, not cached");
            return;
        }
        entries.put(
            *criteria,
            CacheEntry {
                lots,
                stored_at: Instant::now(),
            },
        );
    }
}
