//! geotiler - map images for a bounding box, stitched from slippy map tiles
//!
//! Projects a geographic bounding box onto a spherical Mercator tile
//! pyramid, fetches the covering tiles from a tile service, and composites
//! them into one raster.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use geotiler::compositor::{Compositor, RenderRequest};
//! use geotiler::config::{FetchConfig, RenderConfig};
//! use geotiler::fetch::TileFetcher;
//! use geotiler::provider::{AsyncReqwestClient, ProviderConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let fetcher = Arc::new(TileFetcher::new(AsyncReqwestClient::new()?, FetchConfig::default()));
//! let compositor = Compositor::new(fetcher, RenderConfig::default());
//!
//! let request = RenderRequest::from_bounds(-0.5, 51.3, 0.3, 51.7, 800, 600)?;
//! let provider = ProviderConfig::Osm.create()?;
//! let image = compositor.render(&request, provider, &CancellationToken::new()).await?;
//! image.save("london.png")?;
//! ```

pub mod cache;
pub mod compositor;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod geo;
pub mod logging;
pub mod provider;
pub mod telemetry;

/// Version of the geotiler library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
