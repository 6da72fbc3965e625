//! Shared LRU cache of opened rasters.
//!
//! Each key maps to a once-initialised slot. The cache lock is only held
//! while fetching or inserting the slot, so loading one layer never blocks
//! lookups of another, and concurrent requests for the same layer wait on
//! the slot and share a single load.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use hydro_common::{CellValue, HydroError, HydroResult, Raster};
use lru::LruCache;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::debug;

use crate::source::RasterSource;

type Slot<T> = Arc<OnceCell<Arc<Raster<T>>>>;

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Loads actually started. Failed loads are counted too.
    pub loads: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of rasters keyed by layer id.
///
/// The cell type is fixed per cache. Sources always yield `f64` grids;
/// [`fetch`](Self::fetch) converts them once when the slot is filled.
pub struct RasterCache<T = f64> {
    slots: Mutex<LruCache<String, Slot<T>>>,
    capacity: NonZeroUsize,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
}

impl<T: CellValue> RasterCache<T> {
    /// Create a cache holding up to `capacity` rasters.
    pub fn new(capacity: usize) -> HydroResult<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| HydroError::invalid_parameter("cache.capacity", "must be at least 1"))?;
        Ok(Self {
            slots: Mutex::new(LruCache::new(capacity)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Slot<T>>> {
        // Poisoning is ignored: no code path panics mid-update
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached raster for `key`, running `load` if it is absent.
    ///
    /// At most one `load` runs per key at a time. A failed load leaves the
    /// slot empty so the next request retries.
    pub fn get_or_load<F>(&self, key: &str, load: F) -> HydroResult<Arc<Raster<T>>>
    where
        F: FnOnce() -> HydroResult<Raster<T>>,
    {
        let slot = {
            let mut slots = self.lock();
            match slots.get(key) {
                Some(slot) => Arc::clone(slot),
                None => {
                    let slot: Slot<T> = Arc::default();
                    slots.put(key.to_string(), Arc::clone(&slot));
                    slot
                }
            }
        };

        if let Some(raster) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(raster));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let raster = slot.get_or_try_init(|| {
            self.loads.fetch_add(1, Ordering::Relaxed);
            debug!(layer = key, "Loading raster into cache");
            load().map(Arc::new)
        })?;
        Ok(Arc::clone(raster))
    }

    /// Load a layer from `source` through the cache.
    pub fn fetch(&self, source: &dyn RasterSource, layer_id: &str) -> HydroResult<Arc<Raster<T>>> {
        self.get_or_load(layer_id, || source.load(layer_id).map(|raster| raster.cast()))
    }

    /// Check if a layer has been loaded, without updating LRU order.
    pub fn contains(&self, key: &str) -> bool {
        self.lock()
            .peek(key)
            .map(|slot| slot.get().is_some())
            .unwrap_or(false)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Clear all entries from the cache. Rasters already handed out stay
    /// alive until their last user drops them.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
