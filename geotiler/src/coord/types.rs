//! Coordinate type definitions

use std::fmt;
use std::hash::{Hash, Hasher};

/// Highest zoom level for which tile indices still fit in a `u32`.
pub const MAX_ZOOM: u8 = 30;

/// Column policy for coordinates outside `[0, 2^zoom)`.
///
/// Providers that tile the whole globe horizontally wrap; providers with a
/// bounded extent clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnWrap {
    /// Column taken modulo `2^zoom`
    #[default]
    Wrap,
    /// Out-of-range columns are invalid and skipped
    Clip,
}

/// A position in the tile pyramid.
///
/// Row and column may be fractional, describing a point inside a tile;
/// [`container`](Self::container) floors them to the tile itself. Values are
/// immutable: navigation and rescaling return new coordinates.
///
/// Equality and hashing look at the floored row/column and the zoom, so two
/// positions inside the same tile compare equal.
#[derive(Debug, Clone, Copy)]
pub struct Coordinate {
    row: f64,
    column: f64,
    zoom: u8,
}

impl Coordinate {
    /// Creates a coordinate.
    pub const fn new(row: f64, column: f64, zoom: u8) -> Self {
        Self { row, column, zoom }
    }

    /// Y position, 0 at the north edge.
    pub fn row(&self) -> f64 {
        self.row
    }

    /// X position, 0 at the antimeridian going east.
    pub fn column(&self) -> f64 {
        self.column
    }

    /// Zoom level.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Number of tiles along each axis at this zoom.
    #[inline]
    pub fn grid_size(&self) -> f64 {
        2.0_f64.powi(self.zoom as i32)
    }

    /// Rescales to another zoom level.
    ///
    /// Multiplies by `2^(new_zoom − zoom)`, which is exact in binary floating
    /// point, so rescaling is lossless and path-independent.
    #[inline]
    pub fn zoom_to(&self, zoom: u8) -> Self {
        let factor = 2.0_f64.powi(zoom as i32 - self.zoom as i32);
        Self {
            row: self.row * factor,
            column: self.column * factor,
            zoom,
        }
    }

    /// Rescales by a zoom delta.
    pub fn zoom_by(&self, delta: i8) -> Self {
        let zoom = (self.zoom as i16 + delta as i16).clamp(0, u8::MAX as i16) as u8;
        self.zoom_to(zoom)
    }

    /// The tile containing this position.
    ///
    /// Floors, never rounds: a point on a tile edge belongs to the tile on
    /// its lower-index side.
    #[inline]
    pub fn container(&self) -> Self {
        Self {
            row: self.row.floor(),
            column: self.column.floor(),
            zoom: self.zoom,
        }
    }

    /// Neighbour to the north. Rows never wrap.
    pub fn up(&self) -> Self {
        self.offset(-1.0, 0.0)
    }

    /// Neighbour to the south. Rows never wrap.
    pub fn down(&self) -> Self {
        self.offset(1.0, 0.0)
    }

    /// Neighbour to the west, without wrapping.
    pub fn left(&self) -> Self {
        self.offset(0.0, -1.0)
    }

    /// Neighbour to the east, without wrapping.
    pub fn right(&self) -> Self {
        self.offset(0.0, 1.0)
    }

    /// Moves by whole or fractional tiles.
    pub fn offset(&self, rows: f64, columns: f64) -> Self {
        Self {
            row: self.row + rows,
            column: self.column + columns,
            zoom: self.zoom,
        }
    }

    /// Normalizes the column into `[0, 2^zoom)`.
    pub fn wrap_column(&self) -> Self {
        Self {
            column: self.column.rem_euclid(self.grid_size()),
            ..*self
        }
    }

    /// Applies a column policy.
    ///
    /// Returns `None` when the policy is [`ColumnWrap::Clip`] and the column
    /// lies outside the grid.
    pub fn with_column_policy(&self, policy: ColumnWrap) -> Option<Self> {
        match policy {
            ColumnWrap::Wrap => Some(self.wrap_column()),
            ColumnWrap::Clip => {
                let column = self.column.floor();
                (column >= 0.0 && column < self.grid_size()).then_some(*self)
            }
        }
    }

    /// True when the containing tile lies inside the grid.
    pub fn is_valid(&self) -> bool {
        let n = self.grid_size();
        let tile = self.container();
        tile.row >= 0.0 && tile.row < n && tile.column >= 0.0 && tile.column < n
    }

    /// Integer key of the containing tile, if it is a valid tile.
    pub fn tile_key(&self) -> Option<TileKey> {
        if !self.is_valid() || self.zoom > MAX_ZOOM {
            return None;
        }
        let tile = self.container();
        Some(TileKey {
            zoom: self.zoom,
            row: tile.row as u32,
            column: tile.column as u32,
        })
    }

    /// Floored fields as comparable bits. Adding 0.0 folds -0.0 into 0.0.
    fn key_bits(&self) -> (u64, u64, u8) {
        (
            (self.row.floor() + 0.0).to_bits(),
            (self.column.floor() + 0.0).to_bits(),
            self.zoom,
        )
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(row {:.3}, column {:.3} @ z{})",
            self.row, self.column, self.zoom
        )
    }
}

/// Integer address of one valid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub zoom: u8,
    pub row: u32,
    pub column: u32,
}

impl TileKey {
    pub const fn new(row: u32, column: u32, zoom: u8) -> Self {
        Self { zoom, row, column }
    }

    /// The tile as a coordinate at its north-west corner.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.row as f64, self.column as f64, self.zoom)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.column, self.row)
    }
}

/// Row-major iterator over a rectangle of tiles at one zoom.
///
/// Bounds are inclusive-exclusive integer tile indices and may extend
/// beyond the grid; callers filter invalid tiles.
#[derive(Debug, Clone)]
pub struct TileRange {
    zoom: u8,
    first_row: i64,
    first_column: i64,
    rows: u64,
    columns: u64,
    current: u64,
}

impl TileRange {
    /// Covers every tile whose footprint intersects
    /// `[top_left, bottom_right)`.
    ///
    /// Both coordinates are rescaled to `top_left`'s zoom.
    pub fn covering(top_left: &Coordinate, bottom_right: &Coordinate) -> Self {
        let zoom = top_left.zoom();
        let bottom_right = bottom_right.zoom_to(zoom);

        let first_row = top_left.row().floor() as i64;
        let first_column = top_left.column().floor() as i64;
        let end_row = (bottom_right.row().ceil() as i64).max(first_row);
        let end_column = (bottom_right.column().ceil() as i64).max(first_column);

        Self {
            zoom,
            first_row,
            first_column,
            rows: (end_row - first_row) as u64,
            columns: (end_column - first_column) as u64,
            current: 0,
        }
    }

    /// Index of the first row.
    pub fn first_row(&self) -> i64 {
        self.first_row
    }

    /// Index of the first column.
    pub fn first_column(&self) -> i64 {
        self.first_column
    }

    /// Number of rows spanned.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Number of columns spanned.
    pub fn columns(&self) -> u64 {
        self.columns
    }
}

impl Iterator for TileRange {
    /// `(row index, column index, coordinate)`; indices count from the
    /// first row/column of the range.
    type Item = (u64, u64, Coordinate);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.rows * self.columns {
            return None;
        }

        let row = self.current / self.columns;
        let column = self.current % self.columns;
        self.current += 1;

        let coordinate = Coordinate::new(
            (self.first_row + row as i64) as f64,
            (self.first_column + column as i64) as f64,
            self.zoom,
        );
        Some((row, column, coordinate))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.rows * self.columns - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileRange {}
