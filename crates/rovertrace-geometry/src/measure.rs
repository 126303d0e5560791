//! Distances, bearings and rounding.
//!
//! Bearings follow the mathematical convention of the rover-local frame:
//! `atan2(Δy, Δx)` measured from +X, normalised to `[0, 360)` degrees.

use crate::point::Point3;

/// Euclidean distance between `a` and `b` in 3-space.
pub fn distance_3d(a: Point3, b: Point3) -> f64 {
    b.sub(a).norm()
}

/// Bearing in degrees `[0, 360)` from `a` to `b`, projected onto the x-y
/// plane.  Coincident projections yield `0.0`.
pub fn bearing_2d(a: Point3, b: Point3) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let deg = dy.atan2(dx).to_degrees();
    let normalised = deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if normalised >= 360.0 { 0.0 } else { normalised }
}

/// Perpendicular distance from `p` to the line through `a` and `b`, in
/// 3-space so that elevation changes count.
///
/// When `a` and `b` coincide the distance to `a` is returned.
pub fn perpendicular_distance(p: Point3, a: Point3, b: Point3) -> f64 {
    let ab = b.sub(a);
    let ap = p.sub(a);
    let ab_len = ab.norm();
    if ab_len <= f64::EPSILON {
        return ap.norm();
    }
    ap.cross(ab).norm() / ab_len
}

/// Round `value` to `decimals` decimal places (half away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
