//! Compositor types and errors

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::geo::{GeoError, Location};

/// Errors that fail a whole render.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A bounding-box corner is not a valid location
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// Output width or height is zero
    #[error("Invalid output dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The cancellation token fired before the render finished
    #[error("Render cancelled")]
    Cancelled,

    /// No tile could be fetched (only when configured to fail)
    #[error("All {tiles} tiles were unavailable")]
    AllTilesUnavailable { tiles: usize },
}

/// A bounding box and the size of the raster to draw it into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    north_west: Location,
    south_east: Location,
    width: u32,
    height: u32,
}

impl RenderRequest {
    /// Builds a request from two opposite corners in any order.
    ///
    /// The box spans from the smaller to the larger latitude and longitude;
    /// use [`from_bounds`](Self::from_bounds) for boxes crossing the
    /// antimeridian.
    pub fn new(corner: Location, opposite: Location, width: u32, height: u32) -> Self {
        let north = corner.latitude().max(opposite.latitude());
        let south = corner.latitude().min(opposite.latitude());
        let west = corner.longitude().min(opposite.longitude());
        let east = corner.longitude().max(opposite.longitude());
        Self::from_edges(north, south, west, east, width, height)
    }

    /// Builds a request from `west, south, east, north` degrees.
    ///
    /// The box runs eastward from `west` to `east`. When `east` is greater
    /// than `west` but wraps to a smaller longitude (`east = 180`, or
    /// `170..190` across the antimeridian) the east edge is kept past 180
    /// so the box keeps its width.
    pub fn from_bounds(
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let south_west = Location::new(south, west)?;
        let north_east = Location::new(north, east)?;

        let west_edge = south_west.longitude();
        let mut east_edge = north_east.longitude();
        if east > west && east_edge <= west_edge {
            east_edge += 360.0;
        }

        Ok(Self::from_edges(
            south_west.latitude().max(north_east.latitude()),
            south_west.latitude().min(north_east.latitude()),
            west_edge,
            east_edge,
            width,
            height,
        ))
    }

    fn from_edges(north: f64, south: f64, west: f64, east: f64, width: u32, height: u32) -> Self {
        Self {
            north_west: Location::from_degrees_unchecked(north, west),
            south_east: Location::from_degrees_unchecked(south, east),
            width,
            height,
        }
    }

    pub fn north_west(&self) -> Location {
        self.north_west
    }

    pub fn south_east(&self) -> Location {
        self.south_east
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// What a render did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Zoom level the tiles were drawn at
    pub zoom: u8,
    /// Tiles inside the grid that were resolved
    pub tiles_requested: usize,
    pub tiles_available: usize,
    pub tiles_unavailable: usize,
    /// Tiles outside the grid (rows above/below the poles, clipped columns)
    pub tiles_skipped: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "zoom {}: {}/{} tiles available, {} unavailable, {} skipped in {:.2}s",
            self.zoom,
            self.tiles_available,
            self.tiles_requested,
            self.tiles_unavailable,
            self.tiles_skipped,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_are_normalized() {
        let a = Location::new(10.0, 20.0).unwrap();
        let b = Location::new(-5.0, -30.0).unwrap();
        let request = RenderRequest::new(a, b, 100, 50);

        assert_eq!(request.north_west().latitude(), 10.0);
        assert_eq!(request.north_west().longitude(), -30.0);
        assert_eq!(request.south_east().latitude(), -5.0);
        assert_eq!(request.south_east().longitude(), 20.0);
        assert_eq!((request.width(), request.height()), (100, 50));
    }

    #[test]
    fn test_from_bounds_whole_world_keeps_width() {
        let request = RenderRequest::from_bounds(-180.0, -80.0, 180.0, 80.0, 512, 512).unwrap();
        assert_eq!(request.north_west().longitude(), -180.0);
        assert_eq!(request.south_east().longitude(), 180.0);
    }

    #[test]
    fn test_from_bounds_across_antimeridian() {
        let request = RenderRequest::from_bounds(170.0, -10.0, 190.0, 10.0, 256, 256).unwrap();
        assert_eq!(request.north_west().longitude(), 170.0);
        assert_eq!(request.south_east().longitude(), 190.0);
    }

    #[test]
    fn test_from_bounds_rejects_polar_latitude() {
        let result = RenderRequest::from_bounds(-10.0, -10.0, 10.0, 89.0, 256, 256);
        assert!(matches!(
            result,
            Err(RenderError::Geo(GeoError::InvalidLocation { .. }))
        ));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            RenderError::InvalidDimensions {
                width: 0,
                height: 10
            }
            .to_string(),
            "Invalid output dimensions 0x10"
        );
        assert_eq!(
            RenderError::AllTilesUnavailable { tiles: 4 }.to_string(),
            "All 4 tiles were unavailable"
        );
    }
}
