//! Map compositing
//!
//! Turns a bounding box and an output size into one raster:
//!
//! 1. pick the zoom ([`TileLayout::plan`])
//! 2. enumerate covering tiles and their pixel offsets
//! 3. resolve every tile concurrently through the [`TileFetcher`](crate::fetch::TileFetcher)
//! 4. paste available tiles; unavailable ones leave the background
//!
//! Tile failures never fail a render unless
//! [`RenderConfig::fail_when_all_unavailable`](crate::config::RenderConfig) is set.

mod layout;
mod render;
mod types;

pub use layout::{PlacedTile, TileLayout};
pub use render::Compositor;
pub use types::{RenderError, RenderReport, RenderRequest};
