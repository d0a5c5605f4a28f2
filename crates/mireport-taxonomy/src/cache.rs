//! Load-once taxonomy cache
//!
//! Provides [`TaxonomyCache`]: one initialization cell per entry point, so
//! concurrent first requests for the same taxonomy run the loader exactly
//! once and every caller receives the same shared [`Taxonomy`].

use crate::error::TaxonomyError;
use crate::taxonomy::Taxonomy;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entry points requested so far
    pub requested: usize,
    /// Entry points successfully loaded
    pub loaded: usize,
}

/// Per-process cache of loaded taxonomies
///
/// The outer lock is only held to find or create the cell for an entry
/// point; loading happens inside the cell, so different entry points load
/// in parallel and the same entry point loads once.
#[derive(Debug, Default)]
pub struct TaxonomyCache {
    cells: Mutex<HashMap<String, Arc<OnceCell<Arc<Taxonomy>>>>>,
}

impl TaxonomyCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the taxonomy for `entry_point`, running `load` on first use
    ///
    /// A failed load leaves the cell empty so a later call may retry.
    ///
    /// # Errors
    /// Returns whatever `load` returns on failure
    pub fn get_or_load<F>(&self, entry_point: &str, load: F) -> Result<Arc<Taxonomy>, TaxonomyError>
    where
        F: FnOnce() -> Result<Taxonomy, TaxonomyError>,
    {
        let cell = {
            let mut cells = self.cells.lock();
            Arc::clone(cells.entry(entry_point.to_string()).or_default())
        };

        cell.get_or_try_init(|| {
            tracing::info!(entry_point, "loading taxonomy");
            load().map(Arc::new)
        })
        .map(Arc::clone)
    }

    /// Already-loaded taxonomy, if any
    #[must_use]
    pub fn get(&self, entry_point: &str) -> Option<Arc<Taxonomy>> {
        let cells = self.cells.lock();
        cells.get(entry_point).and_then(|cell| cell.get().cloned())
    }

    /// Entry points loaded so far, sorted
    #[must_use]
    pub fn entry_points(&self) -> Vec<String> {
        let cells = self.cells.lock();
        let mut loaded: Vec<String> = cells
            .iter()
            .filter(|(_, cell)| cell.get().is_some())
            .map(|(ep, _)| ep.clone())
            .collect();
        loaded.sort();
        loaded
    }

    /// Cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let cells = self.cells.lock();
        CacheStats {
            requested: cells.len(),
            loaded: cells.values().filter(|c| c.get().is_some()).count(),
        }
    }
}
