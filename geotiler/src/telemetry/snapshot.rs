//! Point-in-time telemetry snapshot.

use std::fmt;
use std::time::Duration;

/// Immutable copy of [`super::FetchMetrics`] counters.
#[derive(Clone, Debug, Default)]
pub struct FetchSnapshot {
    /// Time since the metrics were created
    pub uptime: Duration,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub coalesced_waits: u64,
    /// HTTP attempts issued, retries included
    pub network_requests: u64,
    pub retries: u64,
    pub tiles_fetched: u64,
    pub tiles_failed: u64,
    pub bytes_downloaded: u64,
    pub total_download_time_ms: u64,
}

impl FetchSnapshot {
    /// Cache hit rate (0.0 - 1.0).
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Download throughput over the uptime, bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.uptime.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.bytes_downloaded as f64 / secs
        }
    }
}

/// Formats a byte count with binary units.
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}

impl fmt::Display for FetchSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tiles: {} fetched, {} failed | cache: {} hits, {} misses ({:.0}%), {} coalesced | \
             network: {} requests, {} retries, {}",
            self.tiles_fetched,
            self.tiles_failed,
            self.cache_hits,
            self.cache_misses,
            self.cache_hit_rate() * 100.0,
            self.coalesced_waits,
            self.network_requests,
            self.retries,
            format_bytes(self.bytes_downloaded),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let snapshot = FetchSnapshot {
            cache_hits: 3,
            cache_misses: 1,
            ..Default::default()
        };
        assert!((snapshot.cache_hit_rate() - 0.75).abs() < 1e-12);
        assert_eq!(FetchSnapshot::default().cache_hit_rate(), 0.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_display() {
        let snapshot = FetchSnapshot {
            tiles_fetched: 4,
            tiles_failed: 1,
            cache_hits: 1,
            cache_misses: 4,
            network_requests: 6,
            retries: 2,
            bytes_downloaded: 2048,
            ..Default::default()
        };
        assert_eq!(
            snapshot.to_string(),
            "tiles: 4 fetched, 1 failed | cache: 1 hits, 4 misses (20%), 0 coalesced | \
             network: 6 requests, 2 retries, 2.0 KB"
        );
    }

    #[test]
    fn test_bytes_per_second() {
        let snapshot = FetchSnapshot {
            uptime: Duration::from_secs(2),
            bytes_downloaded: 1000,
            ..Default::default()
        };
        assert!((snapshot.bytes_per_second() - 500.0).abs() < 1e-9);
    }
}
