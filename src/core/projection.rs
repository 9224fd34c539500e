//! Built-in projection support.
//!
//! Only the two projections every WMS client has to speak are handled here:
//! geographic WGS84 and spherical Web Mercator. Anything else is reported as
//! [`MapError::Projection`] so callers can plug in a richer [`MapView`]
//! implementation.
//!
//! [`MapView`]: crate::traits::MapView

use crate::core::bounds::Bounds;
use crate::core::constants::{METERS_PER_DEGREE, INCHES_PER_METER};
use crate::core::geo::{LatLng, Point};
use crate::{MapError, Result};
use std::fmt;

/// Projections known to the built-in projector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// WGS84 geographic coordinates in degrees
    Wgs84,
    /// Spherical Web Mercator in meters
    WebMercator,
}

/// Axis order of BBOX values in a GetMap request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

impl Projection {
    /// Parses an SRS/CRS identifier such as `EPSG:3857` or `CRS:84`.
    pub fn from_code(code: &str) -> Result<Self> {
        let normalized = code.trim().to_uppercase();
        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" | "URN:OGC:DEF:CRS:EPSG::4326" | "URN:OGC:DEF:CRS:OGC:1.3:CRS84" => {
                Ok(Projection::Wgs84)
            }
            "EPSG:3857" | "EPSG:900913" | "EPSG:102100" | "EPSG:102113" | "EPSG:3785"
            | "URN:OGC:DEF:CRS:EPSG::3857" => Ok(Projection::WebMercator),
            _ => Err(MapError::Projection(code.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Projection::Wgs84 => "EPSG:4326",
            Projection::WebMercator => "EPSG:3857",
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Projection::Wgs84)
    }

    /// Meters covered by one map unit at the equator
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            Projection::Wgs84 => METERS_PER_DEGREE,
            Projection::WebMercator => 1.0,
        }
    }

    /// Map units per pixel at which a map renders with the given scale denominator
    pub fn resolution_for_scale(&self, scale: f64, dpi: f64) -> Result<f64> {
        if !(scale.is_finite() && scale >= 0.0) {
            return Err(MapError::Config(format!("invalid scale denominator {}", scale)));
        }
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(MapError::Config(format!("invalid dpi {}", dpi)));
        }
        Ok(scale / (self.meters_per_unit() * INCHES_PER_METER * dpi))
    }

    /// Transforms a single point from this projection into `target`
    pub fn transform_point(&self, point: Point, target: Projection) -> Point {
        match (self, target) {
            (Projection::Wgs84, Projection::WebMercator) => LatLng::new(point.y, point.x).to_mercator(),
            (Projection::WebMercator, Projection::Wgs84) => {
                let lat_lng = LatLng::from_mercator(point);
                Point::new(lat_lng.lng, lat_lng.lat)
            }
            _ => point,
        }
    }

    /// Reprojects a bounding box by transforming its corners.
    pub fn transform_bounds(&self, bounds: &Bounds, target: Projection) -> Result<Bounds> {
        if !bounds.is_valid() {
            return Err(MapError::InvalidExtent(format!("{:?}", bounds.to_array())));
        }
        if *self == target {
            return Ok(bounds.clone());
        }

        let mut reprojected = Bounds::empty();
        for corner in bounds.corners() {
            reprojected.extend(&self.transform_point(corner, target));
        }

        if !reprojected.is_valid() {
            return Err(MapError::InvalidExtent(format!(
                "{:?} degenerates in {}",
                bounds.to_array(),
                target
            )));
        }
        Ok(reprojected)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Reprojects `bounds` between two projection identifiers.
pub fn reproject_bounds(bounds: &Bounds, from: &str, to: &str) -> Result<Bounds> {
    let source = Projection::from_code(from)?;
    let target = Projection::from_code(to)?;
    source.transform_bounds(bounds, target)
}

/// BBOX axis order for a request in `code` using WMS `version`.
///
/// WMS 1.3.0 uses the natural axis order of the CRS, so `EPSG:4326` is sent
/// latitude first. `CRS:84` and every projected CRS stay easting first.
pub fn axis_order(code: &str, version: &str) -> AxisOrder {
    if version.trim() == "1.3.0" && code.trim().eq_ignore_ascii_case("EPSG:4326") {
        AxisOrder::LatLon
    } else {
        AxisOrder::XY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_projection() {
        assert_eq!(Projection::from_code("EPSG:4326").unwrap(), Projection::Wgs84);
        assert_eq!(Projection::from_code("epsg:3857").unwrap(), Projection::WebMercator);
        assert_eq!(Projection::from_code("EPSG:900913").unwrap(), Projection::WebMercator);
        assert_eq!(Projection::from_code("CRS:84").unwrap(), Projection::Wgs84);
        assert!(matches!(
            Projection::from_code("EPSG:2056"),
            Err(MapError::Projection(code)) if code == "EPSG:2056"
        ));
    }

    #[test]
    fn test_axis_order() {
        assert_eq!(axis_order("EPSG:4326", "1.3.0"), AxisOrder::LatLon);
        assert_eq!(axis_order("EPSG:4326", "1.1.1"), AxisOrder::XY);
        assert_eq!(axis_order("CRS:84", "1.3.0"), AxisOrder::XY);
        assert_eq!(axis_order("EPSG:3857", "1.3.0"), AxisOrder::XY);
    }

    #[test]
    fn test_resolution_for_scale() {
        let res = Projection::WebMercator.resolution_for_scale(10_000.0, 96.0).unwrap();
        assert!((res - 10_000.0 / (39.37 * 96.0)).abs() < 1e-12);

        let deg = Projection::Wgs84.resolution_for_scale(10_000.0, 96.0).unwrap();
        assert!(deg < res);

        assert_eq!(Projection::WebMercator.resolution_for_scale(0.0, 96.0).unwrap(), 0.0);
        assert!(Projection::WebMercator.resolution_for_scale(-1.0, 96.0).is_err());
        assert!(Projection::WebMercator.resolution_for_scale(f64::INFINITY, 96.0).is_err());
        assert!(Projection::WebMercator.resolution_for_scale(1000.0, f64::NAN).is_err());
    }

    #[test]
    fn test_reproject_bounds_to_mercator() {
        let bounds = Bounds::from_coords(-180.0, 0.0, 180.0, 10.0);
        let merc = reproject_bounds(&bounds, "EPSG:4326", "EPSG:3857").unwrap();

        assert!((merc.min.x + 20_037_508.342_789_244).abs() < 1e-6);
        assert!((merc.max.x - 20_037_508.342_789_244).abs() < 1e-6);
        assert!(merc.min.y.abs() < 1e-6);
        assert!(merc.max.y > 1_000_000.0);
    }

    #[test]
    fn test_reproject_identity_and_errors() {
        let bounds = Bounds::from_coords(0.0, 0.0, 1000.0, 1000.0);
        assert_eq!(
            reproject_bounds(&bounds, "EPSG:3857", "EPSG:900913").unwrap(),
            bounds
        );

        let degenerate = Bounds::from_coords(5.0, 5.0, 5.0, 6.0);
        assert!(matches!(
            reproject_bounds(&degenerate, "EPSG:4326", "EPSG:3857"),
            Err(MapError::InvalidExtent(_))
        ));
        assert!(matches!(
            reproject_bounds(&bounds, "EPSG:31467", "EPSG:3857"),
            Err(MapError::Projection(_))
        ));
    }
}
