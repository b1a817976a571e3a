//! Tile provider abstraction
//!
//! A provider tells the fetcher where the tile for a coordinate lives and
//! how its grid is laid out. The HTTP transport is a separate seam
//! ([`AsyncHttpClient`]) so tests can swap in mock clients.
//!
//! # Factory Pattern
//!
//! For centralized provider creation, use [`ProviderConfig`]:
//!
//! ```ignore
//! use geotiler::provider::ProviderConfig;
//!
//! let provider = ProviderConfig::Osm.create()?;
//! ```

mod factory;
mod http;
mod template;
mod types;

pub use factory::ProviderConfig;
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use template::{
    blue_marble, open_cycle_map, osm, UrlTemplateProvider, BLUE_MARBLE_TEMPLATE,
    OPEN_CYCLE_MAP_TEMPLATE, OSM_TEMPLATE,
};
pub use types::{ProviderError, TileProvider};

#[cfg(test)]
pub use http::tests::{png_tile, MockAsyncHttpClient, RecordingHttpClient};
