//! Geographic value types and errors

use std::fmt;

use thiserror::Error;

/// Web Mercator latitude limit in degrees.
///
/// Latitudes must lie strictly inside `(-MAX_LATITUDE, MAX_LATITUDE)`.
pub const MAX_LATITUDE: f64 = 85.05113;

/// Smallest source determinant accepted when deriving a transformation.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Errors raised by the projection and transformation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Control points or coefficients do not define an invertible affine map.
    #[error("Degenerate transformation (determinant {determinant:e})")]
    DegenerateTransform { determinant: f64 },

    /// Latitude outside the Mercator-valid range, or a non-finite value.
    #[error("Invalid location ({latitude}, {longitude}): latitude must be within ±{MAX_LATITUDE}°")]
    InvalidLocation { latitude: f64, longitude: f64 },
}

/// A point in an abstract plane.
///
/// Carries no unit until a projection gives it one: raw Mercator radians,
/// or tile columns/rows after a transformation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

/// A geographic location in degrees.
///
/// Constructed through [`Location::new`], which rejects latitudes outside
/// the Mercator range and normalizes longitude into `[-180, 180)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    /// Creates a validated location.
    ///
    /// # Arguments
    ///
    /// * `latitude` - Degrees, strictly between -85.05113 and 85.05113
    /// * `longitude` - Degrees, any finite value (wrapped modulo 360)
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || latitude <= -MAX_LATITUDE
            || latitude >= MAX_LATITUDE
        {
            return Err(GeoError::InvalidLocation {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude: normalize_longitude(longitude),
        })
    }

    /// Builds a location from radians without range checks.
    ///
    /// Used on the inverse path, where the value comes out of the
    /// projection rather than from a caller.
    pub(crate) fn from_radians(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.to_degrees(),
            longitude: normalize_longitude(longitude.to_degrees()),
        }
    }

    /// Recombines components of locations that were already validated.
    pub(crate) fn from_degrees_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}°, {:.6}°", self.latitude, self.longitude)
    }
}

/// Wraps a longitude into `[-180, 180)`.
///
/// Values already in range are returned unchanged.
pub fn normalize_longitude(longitude: f64) -> f64 {
    if (-180.0..180.0).contains(&longitude) {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_valid() {
        let loc = Location::new(51.5074, -0.1278).unwrap();
        assert_eq!(loc.latitude(), 51.5074);
        assert_eq!(loc.longitude(), -0.1278);
    }

    #[test]
    fn test_location_rejects_pole() {
        let result = Location::new(90.0, 0.0);
        assert!(matches!(result, Err(GeoError::InvalidLocation { .. })));
    }

    #[test]
    fn test_location_rejects_limit_exactly() {
        assert!(Location::new(MAX_LATITUDE, 0.0).is_err());
        assert!(Location::new(-MAX_LATITUDE, 0.0).is_err());
        assert!(Location::new(85.0511, 0.0).is_ok());
    }

    #[test]
    fn test_location_rejects_nan() {
        assert!(Location::new(f64::NAN, 0.0).is_err());
        assert!(Location::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_longitude_normalization() {
        assert_eq!(normalize_longitude(0.0), 0.0);
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
    }

    #[test]
    fn test_normalize_longitude_keeps_in_range_values_exact() {
        for lon in [-0.1278, 151.2093, 0.3, -179.999_999, 179.999_999] {
            assert_eq!(normalize_longitude(lon), lon);
        }
        assert_eq!(normalize_longitude(720.5), 0.5);
    }

    #[test]
    fn test_location_normalizes_longitude() {
        let loc = Location::new(10.0, 370.0).unwrap();
        assert!((loc.longitude() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_error_display() {
        let err = GeoError::InvalidLocation {
            latitude: 90.0,
            longitude: 0.0,
        };
        assert!(err.to_string().contains("Invalid location"));
    }
}
