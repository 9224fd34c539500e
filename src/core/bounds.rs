use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in projected (map unit) coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Creates bounds from a `[minx, miny, maxx, maxy]` array, the layout used by configurations
    pub fn from_array(coords: [f64; 4]) -> Self {
        Self::from_coords(coords[0], coords[1], coords[2], coords[3])
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }

    /// Inverted bounds that any `extend` call will overwrite
    pub fn empty() -> Self {
        Self::from_coords(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        )
    }

    /// Gets the width of the bounds
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Gets the height of the bounds
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Finite and non-degenerate on both axes
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Checks if the bounds intersect with another bounds
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Scales the bounds around their center; `ratio` 2.0 doubles width and height
    pub fn scaled(&self, ratio: f64) -> Bounds {
        let center = self.center();
        let half_width = self.width() * ratio / 2.0;
        let half_height = self.height() * ratio / 2.0;
        Bounds::from_coords(
            center.x - half_width,
            center.y - half_height,
            center.x + half_width,
            center.y + half_height,
        )
    }

    /// Corner points, counter-clockwise from the lower left
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::from_array([0.0, 0.0, 100.0, 50.0]);
        assert_eq!(bounds.width(), 100.0);
        assert_eq!(bounds.height(), 50.0);
        assert_eq!(bounds.center(), Point::new(50.0, 25.0));
        assert_eq!(bounds.to_array(), [0.0, 0.0, 100.0, 50.0]);
    }

    #[test]
    fn test_bounds_validity() {
        assert!(Bounds::from_coords(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Bounds::from_coords(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Bounds::from_coords(0.0, 0.0, f64::NAN, 1.0).is_valid());
        assert!(!Bounds::empty().is_valid());
    }

    #[test]
    fn test_bounds_extend_from_empty() {
        let mut bounds = Bounds::empty();
        bounds.extend(&Point::new(5.0, -3.0));
        bounds.extend(&Point::new(-1.0, 4.0));
        assert_eq!(bounds.to_array(), [-1.0, -3.0, 5.0, 4.0]);
    }

    #[test]
    fn test_bounds_scaled() {
        let bounds = Bounds::from_coords(0.0, 0.0, 10.0, 20.0).scaled(2.0);
        assert_eq!(bounds.to_array(), [-5.0, -10.0, 15.0, 30.0]);
    }

    #[test]
    fn test_bounds_intersection() {
        let a = Bounds::from_coords(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::from_coords(5.0, 5.0, 15.0, 15.0);
        let c = Bounds::from_coords(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(&Point::new(10.0, 0.0)));
    }
}
