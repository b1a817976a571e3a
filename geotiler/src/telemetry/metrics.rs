//! Lock-free atomic metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::FetchSnapshot;

/// Lock-free counters for tile fetching.
///
/// All operations use `Relaxed` ordering; the counters are independent
/// measurements.
#[derive(Debug)]
pub struct FetchMetrics {
    start_time: Instant,

    // === Cache ===
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    /// Requests that joined an in-flight fetch instead of starting one
    coalesced_waits: AtomicU64,

    // === Network ===
    network_requests: AtomicU64,
    retries: AtomicU64,
    /// Tiles that ended up unavailable
    tiles_failed: AtomicU64,
    tiles_fetched: AtomicU64,
    bytes_downloaded: AtomicU64,

    /// Total time spent in HTTP attempts, microseconds
    download_time_us: AtomicU64,
}

impl FetchMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            coalesced_waits: AtomicU64::new(0),
            network_requests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            tiles_failed: AtomicU64::new(0),
            tiles_fetched: AtomicU64::new(0),
            bytes_downloaded: AtomicU64::new(0),
            download_time_us: AtomicU64::new(0),
        }
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn coalesced_wait(&self) {
        self.coalesced_waits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one HTTP attempt being issued.
    pub fn network_request(&self) {
        self.network_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tile_fetched(&self) {
        self.tiles_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tile_failed(&self) {
        self.tiles_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_downloaded(&self, bytes: u64) {
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn download_time(&self, micros: u64) {
        self.download_time_us.fetch_add(micros, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter.
    pub fn snapshot(&self) -> FetchSnapshot {
        FetchSnapshot {
            uptime: self.start_time.elapsed(),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            coalesced_waits: self.coalesced_waits.load(Ordering::Relaxed),
            network_requests: self.network_requests.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            tiles_fetched: self.tiles_fetched.load(Ordering::Relaxed),
            tiles_failed: self.tiles_failed.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            total_download_time_ms: self.download_time_us.load(Ordering::Relaxed) / 1000,
        }
    }
}

impl Default for FetchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
