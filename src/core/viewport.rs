use crate::core::bounds::Bounds;
use crate::core::constants::{EARTH_RADIUS, MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, Point};
use crate::core::projection::{self, Projection};
use crate::traits::MapView;
use crate::Result;

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: u8,
    /// The maximum allowed zoom level
    pub max_zoom: u8,
    /// Projection of the rendered map
    pub projection: Projection,
}

impl Viewport {
    /// Creates a new Web Mercator viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM as f64, MAX_ZOOM as f64),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            projection: Projection::WebMercator,
        }
    }

    /// Switches the map projection, keeping center and zoom
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Sets the center of the viewport
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom as f64, self.max_zoom as f64);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits. The resolution ladder follows these limits.
    pub fn set_zoom_limits(&mut self, min_zoom: u8, max_zoom: u8) {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom as f64, max_zoom as f64);
    }

    /// Map units per pixel at zoom level 0
    fn base_resolution(&self) -> f64 {
        match self.projection {
            Projection::WebMercator => 2.0 * std::f64::consts::PI * EARTH_RADIUS / TILE_SIZE as f64,
            Projection::Wgs84 => 360.0 / TILE_SIZE as f64,
        }
    }

    /// Map units per pixel at the given (possibly fractional) zoom
    pub fn resolution_at(&self, zoom: f64) -> f64 {
        self.base_resolution() / 2_f64.powf(zoom)
    }

    /// Map units per pixel at the current zoom
    pub fn resolution(&self) -> f64 {
        self.resolution_at(self.zoom)
    }

    /// Resolutions of every integer zoom level in `min_zoom..=max_zoom`, coarsest first
    pub fn resolutions(&self) -> Vec<f64> {
        (self.min_zoom..=self.max_zoom)
            .map(|z| self.resolution_at(z as f64))
            .collect()
    }

    /// The view center expressed in map units
    pub fn projected_center(&self) -> Point {
        match self.projection {
            Projection::WebMercator => self.center.to_mercator(),
            Projection::Wgs84 => Point::new(self.center.lng, self.center.lat),
        }
    }

    /// Visible extent in map units
    pub fn extent(&self) -> Bounds {
        let center = self.projected_center();
        let resolution = self.resolution();
        let half_width = self.size.x * resolution / 2.0;
        let half_height = self.size.y * resolution / 2.0;
        Bounds::from_coords(
            center.x - half_width,
            center.y - half_height,
            center.x + half_width,
            center.y + half_height,
        )
    }
}

impl MapView for Viewport {
    fn resolutions(&self) -> Vec<f64> {
        Viewport::resolutions(self)
    }

    fn reproject_bounds(&self, bounds: &Bounds, from: &str, to: &str) -> Result<Bounds> {
        projection::reproject_bounds(bounds, from, to)
    }

    fn resolution_for_scale(&self, scale: f64, projection: &str, dpi: f64) -> Result<f64> {
        Projection::from_code(projection)?.resolution_for_scale(scale, dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(LatLng::new(47.0, 8.0), 25.0, Point::new(800.0, 600.0));
        assert_eq!(viewport.zoom, MAX_ZOOM as f64);
        assert_eq!(viewport.projection, Projection::WebMercator);
    }

    #[test]
    fn test_resolution_ladder() {
        let mut viewport = Viewport::new(LatLng::default(), 3.0, Point::new(256.0, 256.0));
        let resolutions = viewport.resolutions();

        assert_eq!(resolutions.len(), (MAX_ZOOM - MIN_ZOOM) as usize + 1);
        assert!((resolutions[0] - 156_543.033_928_040_97).abs() < 1e-6);
        assert!(resolutions.windows(2).all(|w| (w[0] / w[1] - 2.0).abs() < 1e-12));

        viewport.set_zoom_limits(10, 2);
        assert_eq!(viewport.resolutions().len(), 9);
        assert_eq!(viewport.zoom, 3.0);
    }

    #[test]
    fn test_extent_at_zoom_zero_covers_world() {
        let viewport = Viewport::new(LatLng::default(), 0.0, Point::new(256.0, 256.0));
        let extent = viewport.extent();
        assert!((extent.max.x - 20_037_508.342_789_244).abs() < 1e-3);
        assert!((extent.min.y + 20_037_508.342_789_244).abs() < 1e-3);
    }

    #[test]
    fn test_geographic_viewport() {
        let viewport = Viewport::new(LatLng::new(10.0, 20.0), 1.0, Point::new(512.0, 256.0))
            .with_projection(Projection::Wgs84);
        assert!((viewport.resolution() - 360.0 / 512.0).abs() < 1e-12);
        assert_eq!(viewport.extent().to_array(), [-160.0, -80.0, 200.0, 100.0]);
    }

    #[test]
    fn test_map_view_scale_conversion() {
        let viewport = Viewport::new(LatLng::default(), 0.0, Point::new(256.0, 256.0));
        let res = viewport.resolution_for_scale(5000.0, "EPSG:3857", 96.0).unwrap();
        assert!((res - 5000.0 / (39.37 * 96.0)).abs() < 1e-12);
        assert!(viewport.resolution_for_scale(5000.0, "EPSG:0000", 96.0).is_err());
    }
}
