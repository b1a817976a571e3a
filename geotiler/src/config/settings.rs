//! Fetch and render settings.

use std::time::Duration;

use image::Rgba;

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Attempts per candidate URL before moving to the next one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// First retry delay; doubles on every further attempt.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 100;

/// Per-attempt HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tiles fetched concurrently by one render.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Settings for [`crate::fetch::TileFetcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchConfig {
    /// Attempts per URL (at least 1).
    pub max_attempts: u32,
    /// Delay before the second attempt; attempt n waits `base * 2^(n-2)`.
    pub backoff_base: Duration,
    /// Bound on a single HTTP attempt.
    pub request_timeout: Duration,
    /// Concurrent tile tasks per render (at least 1).
    pub concurrency: usize,
    /// Decoded tiles kept in memory.
    pub cache_capacity: u64,
}

impl FetchConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_cache_capacity(mut self, cache_capacity: u64) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    /// Backoff before attempt `attempt` (1-based). Zero for the first.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let shift = (attempt - 2).min(16);
        self.backoff_base.saturating_mul(1u32 << shift)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Settings for [`crate::compositor::Compositor`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Fill for pixels no tile covers.
    pub background: Rgba<u8>,
    /// Lowest zoom the compositor may choose.
    pub min_zoom: u8,
    /// Highest zoom the compositor may choose. Further limited by the
    /// provider's own range.
    pub max_zoom: u8,
    /// Fail the render with `AllTilesUnavailable` instead of returning a
    /// blank raster.
    pub fail_when_all_unavailable: bool,
}

impl RenderConfig {
    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
        self
    }

    pub fn with_fail_when_all_unavailable(mut self, fail: bool) -> Self {
        self.fail_when_all_unavailable = fail;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Rgba([0, 0, 0, 0]),
            min_zoom: 0,
            max_zoom: 19,
            fail_when_all_unavailable: false,
        }
    }
}
