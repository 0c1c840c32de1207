//! Page store: cached rasters and extracted text runs
//!
//! Rasters live in an LRU cache keyed by page index and are tagged with
//! the scale they were rendered at; a lookup only hits on an exact scale
//! match, so a zoom change naturally forces re-renders. Text items are
//! scale-independent and survive until the document itself changes.
//!
//! The store also owns the generation counter. Invalidation advances it,
//! and raster writes stamped with an older generation are refused, which
//! keeps superseded render runs from resurrecting stale pixels.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::request::Generation;
use super::types::{Raster, TextItem};

/// Scale stored as millionths for stable comparison
fn scale_millionths(scale: f32) -> u32 {
    (scale * 1_000_000.0) as u32
}

/// A rendered page raster together with the scale it was produced at
#[derive(Debug)]
pub struct CachedRaster {
    pub page: usize,
    pub scale: f32,
    pub raster: Raster,
}

/// Per-page cache of rasters and text runs for the current document
pub struct PageStore {
    rasters: LruCache<usize, Arc<CachedRaster>>,
    text_items: HashMap<usize, Arc<Vec<TextItem>>>,
    generation: Generation,
}

impl PageStore {
    /// Create a store holding at most `capacity` rendered pages
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            rasters: LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).expect("1 is non-zero")),
            ),
            text_items: HashMap::new(),
            generation: Generation::new(0),
        }
    }

    /// Current load/scale epoch
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Cached raster for a page, only if it was rendered at `scale`
    #[must_use]
    pub fn raster(&mut self, page: usize, scale: f32) -> Option<Arc<CachedRaster>> {
        let cached = self.rasters.get(&page)?;
        if scale_millionths(cached.scale) == scale_millionths(scale) {
            Some(Arc::clone(cached))
        } else {
            None
        }
    }

    /// Store a page raster, superseding any prior raster for that page
    /// regardless of its scale.
    ///
    /// Returns `false` without storing when `generation` is no longer the
    /// store's current one.
    pub fn store_raster(
        &mut self,
        generation: Generation,
        page: usize,
        scale: f32,
        raster: Raster,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.rasters
            .put(page, Arc::new(CachedRaster { page, scale, raster }));
        true
    }

    /// Extracted text runs for a page, if already indexed
    #[must_use]
    pub fn text_items(&self, page: usize) -> Option<Arc<Vec<TextItem>>> {
        self.text_items.get(&page).cloned()
    }

    /// Fill a page's text index. Idempotent: the first write for a page
    /// wins and later calls return the original items. Returns `None`
    /// without storing when `generation` is stale.
    pub fn store_text_items(
        &mut self,
        generation: Generation,
        page: usize,
        items: Vec<TextItem>,
    ) -> Option<Arc<Vec<TextItem>>> {
        if let Some(existing) = self.text_items.get(&page) {
            return Some(Arc::clone(existing));
        }
        if generation != self.generation {
            return None;
        }
        let arc = Arc::new(items);
        self.text_items.insert(page, Arc::clone(&arc));
        Some(arc)
    }

    /// Drop every raster (text items survive) and start a new generation.
    /// Invoked on scale change.
    pub fn invalidate_rasters(&mut self) -> Generation {
        self.rasters.clear();
        self.generation = self.generation.next();
        self.generation
    }

    /// Drop everything and start a new generation. Invoked on document
    /// change.
    pub fn clear(&mut self) -> Generation {
        self.rasters.clear();
        self.text_items.clear();
        self.generation = self.generation.next();
        self.generation
    }

    /// Number of cached rasters
    #[must_use]
    pub fn raster_count(&self) -> usize {
        self.rasters.len()
    }

    /// Number of pages with an indexed text run list
    #[must_use]
    pub fn indexed_page_count(&self) -> usize {
        self.text_items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::transform::Transform;

    fn test_raster() -> Raster {
        Raster::new(10, 10)
    }

    fn test_items(text: &str) -> Vec<TextItem> {
        vec![TextItem {
            text: text.to_string(),
            transform: Transform::IDENTITY,
            width: 42.0,
            height: 12.0,
        }]
    }

    #[test]
    fn store_and_get_raster() {
        let mut store = PageStore::new(8);
        let generation = store.generation();

        assert!(store.store_raster(generation, 0, 1.0, test_raster()));
        assert!(store.raster(0, 1.0).is_some());
        assert_eq!(store.raster_count(), 1);
    }

    #[test]
    fn raster_misses_on_scale_mismatch() {
        let mut store = PageStore::new(8);
        let generation = store.generation();
        store.store_raster(generation, 0, 1.0, test_raster());

        assert!(store.raster(0, 2.0).is_none());
        assert!(store.raster(0, 1.0).is_some());
    }

    #[test]
    fn store_raster_supersedes_prior_scale() {
        let mut store = PageStore::new(8);
        let generation = store.generation();
        store.store_raster(generation, 0, 1.0, test_raster());
        store.store_raster(generation, 0, 2.0, test_raster());

        assert_eq!(store.raster_count(), 1);
        assert!(store.raster(0, 1.0).is_none());
        assert!(store.raster(0, 2.0).is_some());
    }

    #[test]
    fn stale_generation_write_is_refused() {
        let mut store = PageStore::new(8);
        let stale = store.generation();
        store.invalidate_rasters();

        assert!(!store.store_raster(stale, 0, 1.0, test_raster()));
        assert!(store.raster(0, 1.0).is_none());
    }

    #[test]
    fn lru_evicts_oldest_raster() {
        let mut store = PageStore::new(2);
        let generation = store.generation();
        for page in 0..3 {
            store.store_raster(generation, page, 1.0, test_raster());
        }

        assert_eq!(store.raster_count(), 2);
        assert!(store.raster(0, 1.0).is_none());
        assert!(store.raster(1, 1.0).is_some());
        assert!(store.raster(2, 1.0).is_some());
    }

    #[test]
    fn text_items_fill_is_idempotent() {
        let mut store = PageStore::new(8);
        let generation = store.generation();

        let first = store
            .store_text_items(generation, 0, test_items("first"))
            .expect("current generation");
        let second = store
            .store_text_items(generation, 0, test_items("second"))
            .expect("already filled");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.text_items(0).expect("indexed")[0].text, "first");
    }

    #[test]
    fn invalidate_rasters_keeps_text_items() {
        let mut store = PageStore::new(8);
        let generation = store.generation();
        store.store_raster(generation, 0, 1.0, test_raster());
        store.store_text_items(generation, 0, test_items("kept"));

        store.invalidate_rasters();

        assert_eq!(store.raster_count(), 0);
        assert_eq!(store.indexed_page_count(), 1);
    }

    #[test]
    fn clear_wipes_everything_and_advances_generation() {
        let mut store = PageStore::new(8);
        let generation = store.generation();
        store.store_raster(generation, 0, 1.0, test_raster());
        store.store_text_items(generation, 0, test_items("gone"));

        let next = store.clear();

        assert_ne!(next, generation);
        assert_eq!(store.raster_count(), 0);
        assert_eq!(store.indexed_page_count(), 0);
    }
}
