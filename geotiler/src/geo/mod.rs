//! Projection and coordinate-plane math.
//!
//! Converts between geographic locations, the raw spherical Mercator plane
//! and the tile plane consumed by [`crate::coord::Coordinate`].

mod projection;
mod transform;
mod types;

pub use projection::MercatorProjection;
pub use transform::Transformation;
pub use types::{normalize_longitude, GeoError, Location, Point, DEGENERATE_EPSILON, MAX_LATITUDE};
