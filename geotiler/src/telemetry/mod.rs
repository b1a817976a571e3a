//! Fetch telemetry for observability and user feedback.
//!
//! Lock-free atomic counters updated by [`crate::fetch::TileFetcher`] as it
//! resolves tiles, with point-in-time snapshots for display.
//!
//! # Architecture
//!
//! ```text
//! TileFetcher ─────► FetchMetrics ─────► FetchSnapshot ─────► Views
//!                    (atomic counters)   (point-in-time copy)  (CLI, logs)
//! ```
//!
//! # Example
//!
//! ```
//! use geotiler::telemetry::FetchMetrics;
//!
//! let metrics = FetchMetrics::new();
//! metrics.cache_miss();
//! metrics.network_request();
//! metrics.bytes_downloaded(12_345);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.network_requests, 1);
//! assert_eq!(snapshot.bytes_downloaded, 12_345);
//! ```

mod metrics;
mod snapshot;

pub use metrics::FetchMetrics;
pub use snapshot::FetchSnapshot;
