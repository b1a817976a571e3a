//! URL-template tile providers.
//!
//! Most slippy map services address tiles with a URL pattern such as
//! `https://tile.openstreetmap.org/{z}/{x}/{y}.png`:
//!
//! - `{z}`: zoom level
//! - `{x}`: column (0 to 2^zoom - 1, west to east)
//! - `{y}`: row (0 to 2^zoom - 1, north to south)
//! - `{s}`: optional subdomain, expanded into one candidate URL per host so
//!   load is spread across shards
//!
//! Axis order is whatever the template says, so row/column services such as
//! Blue Marble (`{z}-r{y}-c{x}.jpg`) use the same type.

use crate::coord::{ColumnWrap, Coordinate};
use crate::geo::MercatorProjection;
use crate::provider::{ProviderError, TileProvider};

/// OpenStreetMap standard tile layer.
pub const OSM_TEMPLATE: &str = "http://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// OpenCycleMap tile layer.
pub const OPEN_CYCLE_MAP_TEMPLATE: &str = "http://tile.opencyclemap.org/cycle/{z}/{x}/{y}.png";

/// NASA Blue Marble imagery mirrored by Modest Maps.
pub const BLUE_MARBLE_TEMPLATE: &str =
    "http://s3.amazonaws.com/com.modestmaps.bluemarble/{z}-r{y}-c{x}.jpg";

/// Blue Marble imagery stops at zoom 9.
const BLUE_MARBLE_MAX_ZOOM: u8 = 9;

/// Subdomains used when a template contains `{s}` and none were given.
const DEFAULT_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Tile provider described by a URL template.
///
/// # Example
///
/// ```
/// use geotiler::coord::Coordinate;
/// use geotiler::provider::{TileProvider, UrlTemplateProvider};
///
/// let provider = UrlTemplateProvider::new("local", "http://host/{z}/{x}/{y}.png").unwrap();
/// let urls = provider.tile_urls(&Coordinate::new(10.0, 13.0, 7));
/// assert_eq!(urls, vec!["http://host/7/13/10.png".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct UrlTemplateProvider {
    id: String,
    template: String,
    subdomains: Vec<String>,
    tile_width: u32,
    tile_height: u32,
    min_zoom: u8,
    max_zoom: u8,
    column_wrap: ColumnWrap,
    projection: MercatorProjection,
}

impl UrlTemplateProvider {
    /// Creates a provider from a template.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidTemplate`] if any of `{z}`, `{x}`, `{y}` is
    /// missing.
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Result<Self, ProviderError> {
        let template = template.into();
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !template.contains(placeholder) {
                return Err(ProviderError::InvalidTemplate(format!(
                    "'{}' is missing {}",
                    template, placeholder
                )));
            }
        }
        Ok(Self::from_known(id.into(), template))
    }

    /// Builds a provider from a template known to be valid.
    fn from_known(id: String, template: String) -> Self {
        let subdomains = if template.contains("{s}") {
            DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        Self {
            id,
            template,
            subdomains,
            tile_width: 256,
            tile_height: 256,
            min_zoom: 0,
            max_zoom: 19,
            column_wrap: ColumnWrap::Wrap,
            projection: MercatorProjection::spherical(),
        }
    }

    /// Sets the hosts substituted for `{s}`.
    ///
    /// Ignored when the template has no `{s}`; an empty list keeps the
    /// current hosts.
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subdomains: Vec<String> = subdomains.into_iter().map(Into::into).collect();
        if self.template.contains("{s}") && !subdomains.is_empty() {
            self.subdomains = subdomains;
        }
        self
    }

    /// Sets the tile dimensions in pixels.
    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width.max(1);
        self.tile_height = height.max(1);
        self
    }

    /// Sets the supported zoom range.
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
        self
    }

    /// Sets the column wrap policy.
    pub fn with_column_wrap(mut self, column_wrap: ColumnWrap) -> Self {
        self.column_wrap = column_wrap;
        self
    }

    /// Replaces the projection.
    pub fn with_projection(mut self, projection: MercatorProjection) -> Self {
        self.projection = projection;
        self
    }

    /// The URL template.
    pub fn template(&self) -> &str {
        &self.template
    }

    fn format_url(&self, row: i64, column: i64, zoom: u8, subdomain: Option<&str>) -> String {
        let url = self
            .template
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &column.to_string())
            .replace("{y}", &row.to_string());
        match subdomain {
            Some(s) => url.replace("{s}", s),
            None => url,
        }
    }
}

impl TileProvider for UrlTemplateProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn tile_width(&self) -> u32 {
        self.tile_width
    }

    fn tile_height(&self) -> u32 {
        self.tile_height
    }

    fn projection(&self) -> &MercatorProjection {
        &self.projection
    }

    fn tile_urls(&self, coordinate: &Coordinate) -> Vec<String> {
        let tile = coordinate.container();
        let row = tile.row() as i64;
        let column = tile.column() as i64;
        let zoom = tile.zoom();

        if self.subdomains.is_empty() {
            return vec![self.format_url(row, column, zoom, None)];
        }

        // Rotate the host list per tile so neighbouring tiles start on
        // different shards
        let count = self.subdomains.len();
        let start = (row + column).rem_euclid(count as i64) as usize;
        (0..count)
            .map(|i| {
                let subdomain = &self.subdomains[(start + i) % count];
                self.format_url(row, column, zoom, Some(subdomain))
            })
            .collect()
    }

    fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn column_wrap(&self) -> ColumnWrap {
        self.column_wrap
    }
}

/// OpenStreetMap standard layer.
pub fn osm() -> UrlTemplateProvider {
    UrlTemplateProvider::from_known("osm".to_string(), OSM_TEMPLATE.to_string())
}

/// OpenCycleMap layer.
pub fn open_cycle_map() -> UrlTemplateProvider {
    UrlTemplateProvider::from_known(
        "opencyclemap".to_string(),
        OPEN_CYCLE_MAP_TEMPLATE.to_string(),
    )
}

/// NASA Blue Marble imagery, row/column addressed, JPEG.
pub fn blue_marble() -> UrlTemplateProvider {
    UrlTemplateProvider::from_known("bluemarble".to_string(), BLUE_MARBLE_TEMPLATE.to_string())
        .with_zoom_range(0, BLUE_MARBLE_MAX_ZOOM)
}
