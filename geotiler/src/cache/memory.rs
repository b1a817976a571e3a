//! In-memory tile cache using moka.
//!
//! Wraps `moka::future::Cache` to provide an async-safe, internally sharded
//! cache of decoded tiles with LRU eviction bounded by entry count.
//!
//! Only available tiles are stored. Eviction drops the cache's handle; any
//! render still holding the `Arc<RgbaImage>` keeps its pixels.

use std::sync::Arc;

use image::RgbaImage;
use moka::future::Cache as MokaCache;
use moka::policy::EvictionPolicy;

use super::tile::CacheKey;

/// Default maximum number of cached tiles.
pub const DEFAULT_CACHE_CAPACITY: u64 = 4096;

/// Bounded LRU cache of decoded tiles.
///
/// Cloning is cheap and clones share the same storage.
#[derive(Clone)]
pub struct TileCache {
    cache: MokaCache<CacheKey, Arc<RgbaImage>>,
    capacity: u64,
}

impl TileCache {
    /// Create a cache holding at most `capacity` tiles.
    pub fn new(capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self { cache, capacity }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<RgbaImage>> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, image: Arc<RgbaImage>) {
        self.cache.insert(key, image).await;
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains_key(key)
    }

    pub async fn remove(&self, key: &CacheKey) {
        self.cache.invalidate(key).await;
    }

    /// Approximate number of entries.
    ///
    /// moka applies evictions lazily; call [`Self::run_pending_tasks`]
    /// first for an exact count.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Run moka's pending maintenance (evictions, invalidations).
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCache")
            .field("capacity", &self.capacity)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
