//! Tile pyramid coordinates.
//!
//! Provides the [`Coordinate`] value type (fractional row/column/zoom), its
//! integer [`TileKey`] form, and conversions between geographic locations
//! and tiles on the standard spherical Mercator grid.

mod types;

pub use types::{ColumnWrap, Coordinate, TileKey, TileRange, MAX_ZOOM};

use crate::geo::{GeoError, Location, MercatorProjection};

/// Converts degrees to the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (strictly within ±85.05113)
/// * `lon` - Longitude in degrees (wrapped into [-180, 180))
/// * `zoom` - Zoom level (0 to [`MAX_ZOOM`])
#[inline]
pub fn to_tile_key(lat: f64, lon: f64, zoom: u8) -> Result<TileKey, GeoError> {
    let location = Location::new(lat, lon)?;
    MercatorProjection::spherical()
        .location_to_coordinate(&location, zoom.min(MAX_ZOOM))
        .tile_key()
        .ok_or(GeoError::InvalidLocation {
            latitude: lat,
            longitude: lon,
        })
}

/// Returns the north-west corner of a tile.
#[inline]
pub fn tile_to_location(tile: &TileKey) -> Location {
    MercatorProjection::spherical().coordinate_to_location(&tile.coordinate())
}
