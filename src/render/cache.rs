use std::collections::HashMap;
use std::hash::Hash;

use crate::foundation::error::InkResult;

/// Counters describing cache churn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCacheStats {
    /// Entries currently retained.
    pub retained: usize,
    /// Resources constructed since the cache was created.
    pub created: u64,
    /// Lookups served from an existing entry.
    pub hits: u64,
    /// Resources destroyed by end-of-frame sweeps.
    pub evicted: u64,
}

struct Entry<R> {
    resource: R,
    used: bool,
}

/// Mark-and-sweep cache for render resources keyed by structural content.
///
/// Protocol per frame: [`ResourceCache::begin_frame`], any number of
/// [`ResourceCache::get_or_create`] calls, then [`ResourceCache::end_frame`]. Entries that were not
/// requested between the two are dropped exactly once. Eviction is "not touched this frame", not LRU.
pub struct ResourceCache<K, R> {
    name: &'static str,
    entries: HashMap<K, Entry<R>>,
    stats: ResourceCacheStats,
}

impl<K, R> ResourceCache<K, R>
where
    K: Hash + Eq,
    R: Clone,
{
    /// Create an empty cache. `name` only appears in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
            stats: ResourceCacheStats::default(),
        }
    }

    /// Return the handle for `key`, constructing it with `create` on a miss.
    ///
    /// Either way the entry is marked used for the current frame. A construction error is returned
    /// as-is and nothing is inserted.
    pub fn get_or_create(
        &mut self,
        key: K,
        create: impl FnOnce(&K) -> InkResult<R>,
    ) -> InkResult<R> {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.used = true;
            self.stats.hits = self.stats.hits.saturating_add(1);
            return Ok(entry.resource.clone());
        }

        let resource = create(&key)?;
        self.entries.insert(
            key,
            Entry {
                resource: resource.clone(),
                used: true,
            },
        );
        self.stats.created = self.stats.created.saturating_add(1);
        self.stats.retained = self.entries.len();
        Ok(resource)
    }

    /// Clear every used flag.
    pub fn begin_frame(&mut self) {
        for entry in self.entries.values_mut() {
            entry.used = false;
        }
    }

    /// Drop every entry not requested since [`ResourceCache::begin_frame`]. Returns the count.
    pub fn end_frame(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.used);
        let evicted = before - self.entries.len();
        self.stats.evicted = self.stats.evicted.saturating_add(evicted as u64);
        self.stats.retained = self.entries.len();
        if evicted > 0 {
            tracing::trace!(cache = self.name, evicted, "swept unused render resources");
        }
        evicted
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return `true` if `key` is retained.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Churn counters.
    pub fn stats(&self) -> ResourceCacheStats {
        self.stats
    }

    /// Drop every entry regardless of use.
    pub fn clear(&mut self) {
        let n = self.entries.len();
        self.entries.clear();
        self.stats.evicted = self.stats.evicted.saturating_add(n as u64);
        self.stats.retained = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
