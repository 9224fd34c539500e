//! Tile grid descriptor for tiled WMS layers

use crate::core::bounds::Bounds;
use crate::core::geo::TileCoord;
use crate::{MapError, Result};
use std::ops::Range;

/// Upper bound on the tiles `tiles_for_extent` will enumerate in one call
pub const MAX_TILES_PER_EXTENT: u64 = 1 << 16;

/// Discretization of an extent into zoom levels of fixed-size tiles.
///
/// Tiles are counted from the top-left corner of the extent. The resolution
/// ladder mirrors the map view's, so zoom level `z` of the grid renders at
/// the view's `z`-th resolution, whichever way the view orders its ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    extent: Bounds,
    tile_size: u32,
    max_zoom: usize,
    resolutions: Vec<f64>,
}

impl TileGrid {
    /// Builds a grid over `extent`; `resolutions` must be positive and strictly monotonic
    pub fn new(extent: Bounds, tile_size: u32, resolutions: Vec<f64>) -> Result<Self> {
        if !extent.is_valid() {
            return Err(MapError::InvalidExtent(format!("{:?}", extent.to_array())));
        }
        if tile_size == 0 {
            return Err(MapError::Config("tile size must be positive".into()));
        }
        if resolutions.is_empty() {
            return Err(MapError::Config("tile grid needs at least one resolution".into()));
        }
        let coarsest_first = resolutions.windows(2).all(|w| w[1] < w[0]);
        let finest_first = resolutions.windows(2).all(|w| w[1] > w[0]);
        if resolutions.iter().any(|r| !(r.is_finite() && *r > 0.0)) || !(coarsest_first || finest_first) {
            return Err(MapError::Config(
                "tile grid resolutions must be positive and strictly monotonic".into(),
            ));
        }

        Ok(Self {
            extent,
            tile_size,
            max_zoom: resolutions.len(),
            resolutions,
        })
    }

    pub fn extent(&self) -> &Bounds {
        &self.extent
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Number of resolution levels in the grid
    pub fn max_zoom(&self) -> usize {
        self.max_zoom
    }

    pub fn resolutions(&self) -> &[f64] {
        &self.resolutions
    }

    pub fn resolution(&self, z: u8) -> Option<f64> {
        self.resolutions.get(z as usize).copied()
    }

    /// Zoom level whose resolution is closest to `resolution`
    pub fn zoom_for_resolution(&self, resolution: f64) -> u8 {
        let mut best = 0;
        let mut best_delta = f64::INFINITY;
        for (z, candidate) in self.resolutions.iter().enumerate() {
            let delta = (candidate - resolution).abs();
            if delta < best_delta {
                best = z;
                best_delta = delta;
            }
        }
        best as u8
    }

    /// Map units covered by one tile edge at level `z`
    fn tile_span(&self, z: u8) -> Option<f64> {
        self.resolution(z).map(|res| res * self.tile_size as f64)
    }

    /// Extent of a single tile, `None` for levels outside the ladder
    pub fn tile_extent(&self, coord: TileCoord) -> Option<Bounds> {
        let span = self.tile_span(coord.z)?;
        let min_x = self.extent.min.x + coord.x as f64 * span;
        let max_y = self.extent.max.y - coord.y as f64 * span;
        Some(Bounds::from_coords(min_x, max_y - span, min_x + span, max_y))
    }

    /// Number of tiles at level `z` that intersect both `extent` and the grid extent
    pub fn tile_count(&self, extent: &Bounds, z: u8) -> u64 {
        self.tile_range(extent, z)
            .map_or(0, |(cols, rows)| cols.len() as u64 * rows.len() as u64)
    }

    /// Tiles at level `z` that intersect both `extent` and the grid extent.
    ///
    /// Empty when more than [`MAX_TILES_PER_EXTENT`] tiles would be needed.
    pub fn tiles_for_extent(&self, extent: &Bounds, z: u8) -> Vec<TileCoord> {
        let Some((cols, rows)) = self.tile_range(extent, z) else {
            return Vec::new();
        };
        let count = cols.len() as u64 * rows.len() as u64;
        if count > MAX_TILES_PER_EXTENT {
            log::warn!("{} tiles needed at level {}, refusing to enumerate", count, z);
            return Vec::new();
        }

        let mut tiles = Vec::with_capacity(count as usize);
        for y in rows {
            for x in cols.clone() {
                tiles.push(TileCoord::new(x, y, z));
            }
        }
        tiles
    }

    /// Column and row ranges covering `extent` at level `z`
    fn tile_range(&self, extent: &Bounds, z: u8) -> Option<(Range<u32>, Range<u32>)> {
        let span = self.tile_span(z)?;
        if !self.extent.intersects(extent) {
            return None;
        }

        let min_x = extent.min.x.max(self.extent.min.x);
        let max_x = extent.max.x.min(self.extent.max.x);
        let min_y = extent.min.y.max(self.extent.min.y);
        let max_y = extent.max.y.min(self.extent.max.y);

        let first_col = ((min_x - self.extent.min.x) / span).floor() as u32;
        let last_col = (((max_x - self.extent.min.x) / span).ceil() as u32).max(first_col.saturating_add(1));
        let first_row = ((self.extent.max.y - max_y) / span).floor() as u32;
        let last_row = (((self.extent.max.y - min_y) / span).ceil() as u32).max(first_row.saturating_add(1));

        Some((first_col..last_col, first_row..last_row))
    }
}
