//! Zoom selection and tile placement.
//!
//! Everything here is pure arithmetic on the request and the provider's
//! grid; no tiles are fetched.

use crate::coord::{ColumnWrap, Coordinate, TileRange, MAX_ZOOM};
use crate::provider::TileProvider;

use super::types::RenderRequest;

/// Slack when comparing zoom levels in log2 space, so a box that fits
/// exactly is not pushed one level down by rounding.
const ZOOM_EPSILON: f64 = 1e-9;

/// A tile to draw and where its top-left pixel lands in the output.
///
/// Offsets may be negative or beyond the output; pasting crops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    /// Tile to fetch, column already wrapped into the grid
    pub coordinate: Coordinate,
    pub x: i64,
    pub y: i64,
}

/// Tiles covering one render and their placement.
#[derive(Debug, Clone)]
pub struct TileLayout {
    zoom: u8,
    tile_width: u32,
    tile_height: u32,
    /// Output pixel (0, 0) in global pixels at `zoom`
    origin_x: i64,
    origin_y: i64,
    range: TileRange,
}

impl TileLayout {
    /// Plans a render.
    ///
    /// The zoom is the largest one at which the whole box fits in the
    /// output, clamped to `[min_zoom, max_zoom]` and to the provider's
    /// range. The output is centred on the box centre, at whole-pixel
    /// alignment with the tile grid.
    pub fn plan(
        request: &RenderRequest,
        provider: &dyn TileProvider,
        min_zoom: u8,
        max_zoom: u8,
    ) -> Self {
        let projection = provider.projection();
        let tile_width = provider.tile_width().max(1);
        let tile_height = provider.tile_height().max(1);

        let top_left = projection.location_to_coordinate(&request.north_west(), 0);
        let bottom_right = projection.location_to_coordinate(&request.south_east(), 0);

        let lo = min_zoom.max(provider.min_zoom());
        let hi = max_zoom.min(provider.max_zoom()).min(MAX_ZOOM);
        let zoom = choose_zoom(
            (bottom_right.column() - top_left.column()).max(0.0),
            (bottom_right.row() - top_left.row()).max(0.0),
            request.width(),
            request.height(),
            tile_width,
            tile_height,
            lo.min(hi),
            hi,
        );

        let centre = Coordinate::new(
            (top_left.row() + bottom_right.row()) / 2.0,
            (top_left.column() + bottom_right.column()) / 2.0,
            0,
        )
        .zoom_to(zoom);

        let origin_x =
            (centre.column() * tile_width as f64 - request.width() as f64 / 2.0).round() as i64;
        let origin_y =
            (centre.row() * tile_height as f64 - request.height() as f64 / 2.0).round() as i64;

        let range = TileRange::covering(
            &Coordinate::new(
                origin_y as f64 / tile_height as f64,
                origin_x as f64 / tile_width as f64,
                zoom,
            ),
            &Coordinate::new(
                (origin_y + request.height() as i64) as f64 / tile_height as f64,
                (origin_x + request.width() as i64) as f64 / tile_width as f64,
                zoom,
            ),
        );

        Self {
            zoom,
            tile_width,
            tile_height,
            origin_x,
            origin_y,
            range,
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Tiles spanned, including ones outside the grid.
    pub fn tile_count(&self) -> usize {
        self.range.len()
    }

    /// Splits the covering range into tiles to draw and a count of skipped
    /// ones.
    ///
    /// Rows outside the grid are always skipped; columns follow `wrap`.
    /// Offsets come from one base offset per axis plus whole tile steps.
    pub fn placements(&self, wrap: ColumnWrap) -> (Vec<PlacedTile>, usize) {
        let tile_width = self.tile_width as i64;
        let tile_height = self.tile_height as i64;
        let base_x = self.range.first_column() * tile_width - self.origin_x;
        let base_y = self.range.first_row() * tile_height - self.origin_y;

        let mut placed = Vec::with_capacity(self.range.len());
        let mut skipped = 0;

        for (row_index, column_index, coordinate) in self.range.clone() {
            let Some(coordinate) = coordinate
                .with_column_policy(wrap)
                .filter(Coordinate::is_valid)
            else {
                skipped += 1;
                continue;
            };

            placed.push(PlacedTile {
                coordinate,
                x: base_x + column_index as i64 * tile_width,
                y: base_y + row_index as i64 * tile_height,
            });
        }

        (placed, skipped)
    }
}

/// Largest zoom at which a span of `columns x rows` zoom-0 tiles fits in
/// `width x height` pixels, clamped to `[lo, hi]`.
#[allow(clippy::too_many_arguments)]
fn choose_zoom(
    columns: f64,
    rows: f64,
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    lo: u8,
    hi: u8,
) -> u8 {
    let fit = |span: f64, pixels: u32, tile: u32| -> f64 {
        if span <= 0.0 {
            f64::INFINITY
        } else {
            (pixels as f64 / (span * tile as f64)).log2()
        }
    };

    let best = fit(columns, width, tile_width).min(fit(rows, height, tile_height));
    if !best.is_finite() {
        return if best > 0.0 { hi } else { lo };
    }

    let zoom = (best + ZOOM_EPSILON).floor();
    zoom.clamp(lo as f64, hi as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::MercatorProjection;
    use crate::provider::UrlTemplateProvider;

    fn provider() -> UrlTemplateProvider {
        UrlTemplateProvider::new("test", "http://host/{z}/{x}/{y}.png").unwrap()
    }

    /// Request whose box is exactly the given tile.
    fn tile_request(row: f64, column: f64, zoom: u8, width: u32, height: u32) -> RenderRequest {
        let projection = MercatorProjection::spherical();
        let north_west = projection.coordinate_to_location(&Coordinate::new(row, column, zoom));
        let south_east =
            projection.coordinate_to_location(&Coordinate::new(row + 1.0, column + 1.0, zoom));
        RenderRequest::new(north_west, south_east, width, height)
    }

    #[test]
    fn test_choose_zoom_exact_fit() {
        assert_eq!(choose_zoom(1.0, 1.0, 256, 256, 256, 256, 0, 19), 0);
        assert_eq!(choose_zoom(1.0, 1.0, 512, 512, 256, 256, 0, 19), 1);
        assert_eq!(choose_zoom(1.0 / 128.0, 1.0 / 128.0, 256, 256, 256, 256, 0, 19), 7);
    }

    #[test]
    fn test_choose_zoom_limited_by_tighter_axis() {
        // Wide output, tall box: height decides
        assert_eq!(choose_zoom(0.25, 0.5, 2048, 256, 256, 256, 0, 19), 1);
    }

    #[test]
    fn test_choose_zoom_clamps() {
        assert_eq!(choose_zoom(1.0, 1.0, 16, 16, 256, 256, 0, 19), 0);
        assert_eq!(choose_zoom(1.0, 1.0, 16, 16, 256, 256, 3, 19), 3);
        assert_eq!(choose_zoom(1e-9, 1e-9, 256, 256, 256, 256, 0, 12), 12);
        assert_eq!(choose_zoom(0.0, 0.0, 256, 256, 256, 256, 0, 9), 9);
    }

    #[test]
    fn test_single_tile_box() {
        let layout = TileLayout::plan(&tile_request(10.0, 13.0, 7, 256, 256), &provider(), 0, 19);
        let (tiles, skipped) = layout.placements(ColumnWrap::Wrap);

        assert_eq!(layout.zoom(), 7);
        assert_eq!(skipped, 0);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].coordinate, Coordinate::new(10.0, 13.0, 7));
        assert_eq!((tiles[0].x, tiles[0].y), (0, 0));
    }

    #[test]
    fn test_double_size_uses_next_zoom() {
        let layout = TileLayout::plan(&tile_request(10.0, 13.0, 7, 512, 512), &provider(), 0, 19);
        let (tiles, _) = layout.placements(ColumnWrap::Wrap);

        assert_eq!(layout.zoom(), 8);
        let mut offsets: Vec<_> = tiles.iter().map(|t| (t.x, t.y)).collect();
        offsets.sort();
        assert_eq!(offsets, vec![(0, 0), (0, 256), (256, 0), (256, 256)]);
        assert!(tiles.contains(&PlacedTile {
            coordinate: Coordinate::new(20.0, 26.0, 8),
            x: 0,
            y: 0,
        }));
    }

    #[test]
    fn test_offsets_step_by_whole_tiles() {
        let request = RenderRequest::from_bounds(-0.3, 51.4, 0.1, 51.6, 700, 500).unwrap();
        let layout = TileLayout::plan(&request, &provider(), 0, 19);
        let (tiles, _) = layout.placements(ColumnWrap::Wrap);

        let min_x = tiles.iter().map(|t| t.x).min().unwrap();
        let min_y = tiles.iter().map(|t| t.y).min().unwrap();
        assert!(min_x <= 0 && min_x > -256);
        assert!(min_y <= 0 && min_y > -256);
        for tile in &tiles {
            assert_eq!((tile.x - min_x) % 256, 0);
            assert_eq!((tile.y - min_y) % 256, 0);
            assert!(tile.x < 700 && tile.y < 500);
        }

        let columns = (700 - min_x + 255) / 256;
        let rows = (500 - min_y + 255) / 256;
        assert_eq!(tiles.len() as i64, columns * rows);
    }

    #[test]
    fn test_rows_beyond_poles_are_skipped() {
        let request = RenderRequest::from_bounds(-180.0, -85.0, 180.0, 85.0, 256, 512).unwrap();
        let layout = TileLayout::plan(&request, &provider(), 0, 19);
        let (tiles, skipped) = layout.placements(ColumnWrap::Wrap);

        assert_eq!(layout.zoom(), 0);
        assert_eq!(layout.tile_count(), 3);
        assert_eq!(skipped, 2);
        assert_eq!(tiles.len(), 1);
        assert_eq!((tiles[0].x, tiles[0].y), (0, 128));
    }

    #[test]
    fn test_columns_wrap_or_clip() {
        // Whole world at zoom 0 in a wide image repeats the single tile
        let request = RenderRequest::from_bounds(-180.0, -60.0, 180.0, 60.0, 768, 128).unwrap();
        let layout = TileLayout::plan(&request, &provider(), 0, 19);
        assert_eq!(layout.zoom(), 0);

        let (wrapped, skipped) = layout.placements(ColumnWrap::Wrap);
        assert_eq!(skipped, 0);
        assert!(wrapped.len() >= 3);
        assert!(wrapped
            .iter()
            .all(|t| t.coordinate == Coordinate::new(0.0, 0.0, 0)));

        let (clipped, skipped) = layout.placements(ColumnWrap::Clip);
        assert_eq!(clipped.len(), 1);
        assert_eq!(skipped, wrapped.len() - 1);
    }

    #[test]
    fn test_provider_zoom_range_limits_choice() {
        let request = tile_request(10.0, 13.0, 7, 256, 256);
        let capped = provider().with_zoom_range(0, 5);

        assert_eq!(TileLayout::plan(&request, &capped, 0, 19).zoom(), 5);
        assert_eq!(TileLayout::plan(&request, &provider(), 0, 4).zoom(), 4);
    }
}
