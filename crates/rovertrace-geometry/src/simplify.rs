//! Douglas–Peucker polyline simplification.
//!
//! The first and last points are always kept.  For each span the interior
//! point farthest from the chord joining the span's endpoints is found; if
//! its perpendicular distance exceeds the tolerance it is kept and both
//! halves are processed in turn, otherwise every interior point of the span
//! is discarded.
//!
//! Deviation is measured in 3-space (see
//! [`perpendicular_distance`][crate::measure::perpendicular_distance]), so a
//! climb over a ridge survives even when the x-y projection is straight.
//!
//! Spans are processed from an explicit work stack rather than by native
//! recursion; a multi-thousand-point traverse cannot overflow the call stack.
//!
//! # Example
//!
//! ```rust
//! use rovertrace_geometry::{simplify, Point3};
//!
//! let a = Point3::new(0.0, 0.0, 0.0);
//! let b = Point3::new(10.0, 0.0, 5.0);
//! let c = Point3::new(20.0, 0.0, 0.0);
//!
//! assert_eq!(simplify(&[a, b, c], 6.0), vec![a, c]);
//! assert_eq!(simplify(&[a, b, c], 4.0), vec![a, b, c]);
//! ```

use tracing::trace;

use crate::measure::perpendicular_distance;
use crate::point::Point3;

/// Indices (ascending) of the points kept by Douglas–Peucker at
/// `tolerance_m`.  Inputs of two points or fewer are returned whole.
pub fn simplify_indices(points: &[Point3], tolerance_m: f64) -> Vec<usize> {
    let n = points.len();
    if n <= 2 {
        return (0..n).collect();
    }

    let tolerance = tolerance_m.max(0.0);
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut spans: Vec<(usize, usize)> = vec![(0, n - 1)];
    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }

        let (a, b) = (points[start], points[end]);
        let mut max_idx = start;
        let mut max_dist = -1.0_f64;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = perpendicular_distance(*p, a, b);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            keep[max_idx] = true;
            spans.push((max_idx, end));
            spans.push((start, max_idx));
        }
    }

    let kept: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect();
    trace!(input = n, kept = kept.len(), tolerance, "douglas-peucker pass");
    kept
}

/// Douglas–Peucker simplification returning the kept points in order.
pub fn simplify(points: &[Point3], tolerance_m: f64) -> Vec<Point3> {
    simplify_indices(points, tolerance_m)
        .into_iter()
        .map(|i| points[i])
        .collect()
}
