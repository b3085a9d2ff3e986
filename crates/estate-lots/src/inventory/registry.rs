use super::cache::{CacheStats, SearchCache};
use super::criteria::{NamedFilter, SearchCriteria};
use super::domain::{Feature, LotError, LotId, LotRecord, LotStatus, BLOCK_COUNT, LOTS_PER_BLOCK};
use super::factory::{self, LotChange};
use super::report::InventoryReport;
use super::store::PersistenceStore;
use super::view::LotView;
use crate::config::{CacheConfig, InventoryConfig};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Where the registry's initial inventory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventorySource {
    Loaded(usize),
    Seeded(usize),
}

/// Authoritative map from lot id to the current chain head.
///
/// Every mutation replaces a single map entry while holding that entry's lock, then
/// clears the search cache. Readers never observe a half-applied change.
pub struct LotRegistry {
    lots: DashMap<LotId, LotView>,
    cache: SearchCache,
    store: PersistenceStore,
    scans: AtomicU64,
}

impl LotRegistry {
    /// Empty registry; call [`LotRegistry::initialize`] to populate it.
    pub fn new(store: PersistenceStore, cache: &CacheConfig) -> Self {
        Self {
            lots: DashMap::new(),
            cache: SearchCache::new(cache),
            store,
            scans: AtomicU64::new(0),
        }
    }

    pub fn open(config: &InventoryConfig) -> Self {
        let registry = Self::new(PersistenceStore::from_config(&config.data), &config.cache);
        registry.initialize();
        registry
    }

    /// Loads the persisted inventory, or seeds the default 5 x 20 grid when nothing
    /// usable is stored.
    pub fn initialize(&self) -> InventorySource {
        self.lots.clear();

        let loaded = self.store.load();
        let source = if loaded.is_empty() {
            for block in 1..=BLOCK_COUNT {
                for lot_number in 1..=LOTS_PER_BLOCK {
                    let view = LotView::base_lot(LotRecord::seeded(block, lot_number));
                    self.lots.insert(view.id().clone(), view);
                }
            }
            InventorySource::Seeded(self.lots.len())
        } else {
            let count = loaded.len();
            for view in loaded {
                self.lots.insert(view.id().clone(), view);
            }
            InventorySource::Loaded(count)
        };

        self.cache.invalidate();
        info!(?source, "lot inventory initialized");
        source
    }

    pub fn add_lot(
        &self,
        block: u32,
        lot_number: u32,
        size: f64,
        price: f64,
    ) -> Result<LotView, LotError> {
        let record = LotRecord::new(block, lot_number, size, price)?;
        self.insert(LotView::base_lot(record))
    }

    /// Adds a lot built from a named package (`starter`, `family`, `luxury`, ...).
    pub fn add_from_template(
        &self,
        template: &str,
        block: u32,
        lot_number: u32,
    ) -> Result<LotView, LotError> {
        let view = factory::from_template(template, block, lot_number)?;
        self.insert(view)
    }

    fn insert(&self, view: LotView) -> Result<LotView, LotError> {
        match self.lots.entry(view.id().clone()) {
            Entry::Occupied(_) => return Err(LotError::Duplicate(view.id().clone())),
            Entry::Vacant(slot) => {
                slot.insert(view.clone());
            }
        }

        self.cache.invalidate();
        info!(id = %view.id(), price = view.price(), "lot added");
        Ok(view)
    }

    /// Applies a status named by `status` (`reserve`, `sell`, ...).
    pub fn change_status(&self, id: &str, status: &str) -> Result<LotChange, LotError> {
        self.mutate(id, |view| factory::change_status(view, status))
    }

    pub fn transition(&self, id: &str, status: LotStatus) -> Result<LotChange, LotError> {
        self.mutate(id, |view| factory::transition(view, status))
    }

    pub fn reserve(&self, id: &str) -> Result<LotChange, LotError> {
        self.transition(id, LotStatus::Reserved)
    }

    pub fn sell(&self, id: &str) -> Result<LotChange, LotError> {
        self.transition(id, LotStatus::Sold)
    }

    /// Attaches the feature named by `feature` (`pool`, `fencing`, `landscaping`).
    pub fn add_feature(&self, id: &str, feature: &str) -> Result<LotChange, LotError> {
        self.mutate(id, |view| factory::add_feature(view, feature))
    }

    pub fn attach_feature(&self, id: &str, feature: Feature) -> Result<LotChange, LotError> {
        self.mutate(id, |view| Ok(factory::attach_feature(view, feature)))
    }

    fn mutate<F>(&self, id: &str, apply: F) -> Result<LotChange, LotError>
    where
        F: FnOnce(&LotView) -> Result<LotChange, LotError>,
    {
        let id = id.trim();
        let change = {
            let mut entry = self
                .lots
                .get_mut(id)
                .ok_or_else(|| LotError::NotFound(id.to_string()))?;
            let change = apply(entry.value())?;
            if change.is_changed() {
                *entry.value_mut() = change.view().clone();
            }
            change
        };

        if change.is_changed() {
            self.cache.invalidate();
            debug!(id, description = %change.view(), "lot updated");
        }
        Ok(change)
    }

    pub fn get(&self, id: &str) -> Option<LotView> {
        self.lots.get(id.trim()).map(|entry| entry.value().clone())
    }

    /// Conjunction of the criteria's filters over the current inventory, served from
    /// the search cache while fresh.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<LotView> {
        self.cache
            .get_or_compute(criteria, || {
                self.scan(|view| criteria.matches(view))
            })
            .to_vec()
    }

    pub fn filter(&self, filter: NamedFilter) -> Vec<LotView> {
        self.scan(|view| filter.matches(view))
    }

    /// Snapshot of every lot ordered by block and lot number.
    pub fn all(&self) -> Vec<LotView> {
        let mut lots: Vec<LotView> = self
            .lots
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_by_position(&mut lots);
        lots
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Number of full inventory scans performed by searches and named filters.
    pub fn scan_count(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn report(&self) -> InventoryReport {
        InventoryReport::from_views(&self.all())
    }

    pub fn store(&self) -> &PersistenceStore {
        &self.store
    }

    pub fn save(&self) -> bool {
        self.store.save(&self.all())
    }

    /// Persists the inventory before the registry is dropped.
    pub fn close(self) -> bool {
        self.save()
    }

    fn scan<P>(&self, predicate: P) -> Vec<LotView>
    where
        P: Fn(&LotView) -> bool,
    {
        self.scans.fetch_add(1, Ordering::Relaxed);
        let mut lots: Vec<LotView> = self
            .lots
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_by_position(&mut lots);
        lots
    }
}

fn sort_by_position(lots: &mut [LotView]) {
    lots.sort_by_key(|view| (view.base().block(), view.base().lot_number()));
}
