//! Year -> normalized player-season rows, memoized for the lifetime of the
//! owning [`crate::profile::Pipeline`].
//!
//! Entries are never evicted. Two callers racing on the same cold year both
//! fetch and the second `put` overwrites the first with equal data.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::records::PlayerSeason;

pub type SeasonRows = Arc<Vec<PlayerSeason>>;

/// Backing storage for cached seasons.
pub trait SeasonStore: Send + Sync {
    fn get(&self, year: i32) -> Option<SeasonRows>;
    fn put(&self, year: i32, rows: SeasonRows);
}

#[derive(Debug, Default)]
pub struct InMemorySeasonStore {
    entries: RwLock<HashMap<i32, SeasonRows>>,
}

impl SeasonStore for InMemorySeasonStore {
    fn get(&self, year: i32) -> Option<SeasonRows> {
        let guard = self.entries.read().ok()?;
        guard.get(&year).cloned()
    }

    fn put(&self, year: i32, rows: SeasonRows) {
        // A poisoned lock only costs us the memo.
        if let Ok(mut guard) = self.entries.write() {
            guard.insert(year, rows);
        }
    }
}

pub struct SeasonCache {
    store: Box<dyn SeasonStore>,
}

impl Default for SeasonCache {
    fn default() -> Self {
        Self::new(Box::new(InMemorySeasonStore::default()))
    }
}

impl SeasonCache {
    pub fn new(store: Box<dyn SeasonStore>) -> Self {
        Self { store }
    }

    /// Cached rows for `year`, or the result of `fetch` stored for next time.
    /// Errors are not cached.
    pub fn get_or_fetch<F>(&self, year: i32, fetch: F) -> Result<SeasonRows>
    where
        F: FnOnce() -> Result<Vec<PlayerSeason>>,
    {
        if let Some(rows) = self.store.get(year) {
            return Ok(rows);
        }
        let rows = Arc::new(fetch()?);
        self.store.put(year, Arc::clone(&rows));
        Ok(rows)
    }
}
