//! Tile fetching
//!
//! Resolves a [`Coordinate`](crate::coord::Coordinate) to a decoded tile.
//!
//! ```text
//! resolve ──► TileCache hit? ──yes──► Available
//!                  │ no
//!                  ▼
//!            in-flight map ──existing cell──► wait for shared result
//!                  │ new cell
//!                  ▼
//!            for each URL: attempt 1..=max_attempts
//!              (timeout, backoff, decode in spawn_blocking)
//!                  │
//!                  ▼
//!            Available (cached) │ Unavailable (not cached)
//! ```
//!
//! Concurrent requests for one tile share a single network fetch.

mod download;
mod fetcher;

pub use fetcher::TileFetcher;
