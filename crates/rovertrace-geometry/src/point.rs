//! Points and axis-aligned bounds.
//!
//! # Example
//!
//! ```rust
//! use rovertrace_geometry::point::{BoundingBox, Point3};
//!
//! let mut bbox = BoundingBox::from_point(Point3::new(1.0, 2.0, 3.0));
//! bbox.expand(Point3::new(-1.0, 5.0, 0.0));
//!
//! assert_eq!(bbox.min, Point3::new(-1.0, 2.0, 0.0));
//! assert_eq!(bbox.max, Point3::new(1.0, 5.0, 3.0));
//! assert!(bbox.contains_point(Point3::new(0.0, 3.0, 1.0)));
//! ```

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Point3
// ────────────────────────────────────────────────────────────────────────────

/// A point (or displacement) in 3-D space, metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Componentwise difference `self − rhs`.
    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Euclidean length when treated as a vector.
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// As a `[x, y, z]` array, the coordinate layout used by GeoJSON.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BoundingBox
// ────────────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box, grown one point at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    /// A degenerate box enclosing exactly `p`.
    pub fn from_point(p: Point3) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box enclosing every point in `points`, or `None` when empty.
    pub fn enclosing<I: IntoIterator<Item = Point3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bbox = Self::from_point(iter.next()?);
        for p in iter {
            bbox.expand(p);
        }
        Some(bbox)
    }

    /// Grow the box (componentwise min/max) so it encloses `p`.
    pub fn expand(&mut self, p: Point3) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// True when the point lies inside or on the boundary of the box.
    pub fn contains_point(&self, p: Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Extent along each axis.
    pub fn size(&self) -> Point3 {
        self.max.sub(self.min)
    }
}
