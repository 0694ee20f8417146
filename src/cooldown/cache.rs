//! Bounded in-memory cache of version metadata
//!
//! Publish times never change upstream, so entries have no TTL and are only
//! dropped by least-recently-used eviction when the cache is full.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::cooldown::error::CacheError;
use crate::cooldown::types::VersionInfo;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub module: String,
    pub version: String,
}

impl CacheKey {
    pub fn new(module: &str, version: &str) -> Self {
        Self {
            module: module.to_string(),
            version: version.to_string(),
        }
    }
}

/// Thread-safe LRU cache keyed by (module, version)
pub struct MetadataCache {
    entries: Mutex<LruCache<CacheKey, Arc<VersionInfo>>>,
}

impl MetadataCache {
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;

        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Looks up an entry, marking it as most recently used
    pub fn get(&self, key: &CacheKey) -> Option<Arc<VersionInfo>> {
        self.entries.lock().get(key).cloned()
    }

    /// Inserts or replaces an entry, evicting the least recently used one when full
    pub fn put(&self, key: CacheKey, info: Arc<VersionInfo>) {
        self.entries.lock().put(key, info);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}
