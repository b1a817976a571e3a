//! Tile cache
//!
//! Decoded tiles are kept in a bounded in-memory LRU keyed by provider and
//! tile address. The cache is plain injected state: create one per
//! [`crate::fetch::TileFetcher`] (or share an `Arc` between fetchers).

mod memory;
mod tile;

pub use memory::{TileCache, DEFAULT_CACHE_CAPACITY};
pub use tile::{CacheKey, TileImage};
