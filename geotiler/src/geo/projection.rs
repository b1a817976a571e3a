//! Spherical Mercator projection onto the tile plane.
//!
//! The projection runs in two steps:
//!
//! ```text
//! Location ──raw_project──► raw Mercator plane ──Transformation──► tile plane
//!  (deg)                    (radians, ln·tan)                      (col, row)
//! ```
//!
//! Every provider shares the convention that the transformation maps the
//! projected world square `[-π, π]²` onto the unit square at zoom 0, so tile
//! math is the same for all providers.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::transform::Transformation;
use super::types::{GeoError, Location, Point};
use crate::coord::Coordinate;

/// Coefficients of the world-square to unit-square map, `1/2π` scale.
const INV_TWO_PI: f64 = 1.0 / (2.0 * PI);

/// Spherical Mercator projection composed with an affine transformation.
///
/// Immutable after construction and `Copy`, so it is shared freely between
/// fetch tasks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorProjection {
    zoom: u8,
    transformation: Transformation,
    inverse: Transformation,
}

impl MercatorProjection {
    /// Creates a projection whose transformation outputs tile coordinates
    /// at `zoom`.
    pub fn new(zoom: u8, transformation: Transformation) -> Result<Self, GeoError> {
        let inverse = transformation.invert()?;
        Ok(Self {
            zoom,
            transformation,
            inverse,
        })
    }

    /// The projection used by slippy map tile services.
    ///
    /// Equivalent to deriving the transformation from
    /// `(-π, π) → (0, 0)`, `(π, π) → (1, 0)`, `(-π, -π) → (0, 1)` at zoom 0.
    pub fn spherical() -> Self {
        Self {
            zoom: 0,
            transformation: Transformation::from_raw(
                INV_TWO_PI, 0.0, 0.5, 0.0, -INV_TWO_PI, 0.5,
            ),
            inverse: Transformation::from_raw(2.0 * PI, 0.0, -PI, 0.0, -2.0 * PI, PI),
        }
    }

    /// Zoom level of the transformation's output plane.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// The forward transformation.
    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Raw spherical Mercator: `x = λ`, `y = ln(tan(π/4 + φ/2))`, radians.
    ///
    /// Latitude range is enforced by [`Location::new`], so the result is
    /// always finite.
    #[inline]
    pub fn raw_project(location: &Location) -> Point {
        let lat = location.latitude().to_radians();
        let lon = location.longitude().to_radians();
        Point::new(lon, (FRAC_PI_4 + lat / 2.0).tan().ln())
    }

    /// Inverse of [`raw_project`](Self::raw_project):
    /// `φ = 2·atan(eʸ) − π/2`, `λ = x`.
    #[inline]
    pub fn raw_unproject(point: Point) -> Location {
        let lat = 2.0 * point.y.exp().atan() - FRAC_PI_2;
        Location::from_radians(lat, point.x)
    }

    /// Projects a location onto the tile plane at the projection's zoom.
    ///
    /// `x` is the column, `y` the row.
    pub fn location_to_point(&self, location: &Location) -> Point {
        self.transformation.apply(Self::raw_project(location))
    }

    /// Maps a tile-plane point back to a location.
    ///
    /// Points outside the world square produce latitudes beyond the
    /// Mercator limit; the result is not range-checked.
    pub fn point_to_location(&self, point: Point) -> Location {
        Self::raw_unproject(self.inverse.apply(point))
    }

    /// Fractional tile coordinate of `location` at `zoom`.
    pub fn location_to_coordinate(&self, location: &Location, zoom: u8) -> Coordinate {
        let point = self.location_to_point(location);
        Coordinate::new(point.y, point.x, self.zoom).zoom_to(zoom)
    }

    /// Location of a (possibly fractional) coordinate.
    ///
    /// For an integer coordinate this is the tile's north-west corner.
    pub fn coordinate_to_location(&self, coordinate: &Coordinate) -> Location {
        let base = coordinate.zoom_to(self.zoom);
        self.point_to_location(Point::new(base.column(), base.row()))
    }
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self::spherical()
    }
}
