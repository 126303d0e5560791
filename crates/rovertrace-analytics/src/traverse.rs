//! Traverse Path Builder.
//!
//! Reconstructs the path a vehicle followed from the positions attached to
//! its images.
//!
//! 1. Records without a parseable position are skipped.
//! 2. Positions are rounded to centimetres and deduplicated; each unique
//!    point remembers the first and last sol it was observed on.
//! 3. Points are ordered by first sol (first-visit order; ties keep the order
//!    in which points were first seen).
//! 4. With a positive tolerance and more than two points the path is reduced
//!    with Douglas–Peucker.
//! 5. One walk over the final points accumulates cumulative 3-D distance,
//!    elevation gain and loss, and the bounding box, and optionally attaches
//!    per-segment distance, bearing and elevation change.
//!
//! Values are accumulated at full precision and rounded only when
//! serialized.
//!
//! [`TraverseAccumulator`] accepts records batch by batch, so a caller can
//! stream a wide sol range through it while holding only one entry per
//! unique position.  [`build`] is the one-shot form.
//!
//! # Example
//!
//! ```rust
//! use rovertrace_analytics::traverse::{build, TraverseOptions};
//! use rovertrace_types::{Position, TelemetryRecord};
//!
//! let records = vec![
//!     TelemetryRecord::new(1, "spirit", 1, "NAV").with_position(Position::new(0.0, 0.0, 0.0)),
//!     TelemetryRecord::new(2, "spirit", 2, "NAV").with_position(Position::new(3.0, 4.0, 0.0)),
//! ];
//!
//! let result = build(&records, &TraverseOptions::default());
//! assert_eq!(result.points.len(), 2);
//! assert!((result.summary.total_distance_m - 5.0).abs() < 1e-9);
//! ```

use std::collections::HashMap;

use rovertrace_geometry::{BoundingBox, Point3, bearing_2d, distance_3d, simplify_indices};
use rovertrace_types::{Sol, SolRange, TelemetryRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grouping::PositionKey;
use crate::output::{bbox2, round1, round2};

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

/// Knobs for [`build`] / [`TraverseAccumulator::finish`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraverseOptions {
    /// Douglas–Peucker tolerance in metres; `0` disables simplification.
    pub simplify_tolerance_m: f64,
    /// Attach [`Segment`] metadata to every point after the first.
    pub include_segments: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Geometry of the step from the previous point to this one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    #[serde(serialize_with = "round2")]
    pub distance_m: f64,
    #[serde(serialize_with = "round1")]
    pub bearing_deg: f64,
    #[serde(serialize_with = "round2")]
    pub elevation_change_m: f64,
}

/// One deduplicated position on the path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraversePoint {
    #[serde(serialize_with = "round2")]
    pub x: f64,
    #[serde(serialize_with = "round2")]
    pub y: f64,
    #[serde(serialize_with = "round2")]
    pub z: f64,
    pub first_sol: Sol,
    pub last_sol: Sol,
    /// Path length from the first point, metres.
    #[serde(serialize_with = "round2")]
    pub cumulative_distance_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
}

impl TraversePoint {
    pub fn point(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Whole-path statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraverseSummary {
    #[serde(serialize_with = "round2")]
    pub total_distance_m: f64,
    #[serde(serialize_with = "round2")]
    pub elevation_gain_m: f64,
    #[serde(serialize_with = "round2")]
    pub elevation_loss_m: f64,
    /// Last point's elevation minus the first's.
    #[serde(serialize_with = "round2")]
    pub net_elevation_change_m: f64,
    /// Unique points before simplification.
    pub original_point_count: usize,
    /// Points kept by simplification; `None` when it did not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simplified_point_count: Option<usize>,
    #[serde(serialize_with = "bbox2")]
    pub bounding_box: Option<BoundingBox>,
    /// Earliest first-sol to latest last-sol over all unique points.
    pub sol_range: Option<SolRange>,
}

/// A reconstructed traverse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraverseResult {
    pub summary: TraverseSummary,
    pub points: Vec<TraversePoint>,
}

impl TraverseResult {
    /// A well-formed result with no points.
    pub fn empty() -> Self {
        Self {
            summary: TraverseSummary {
                total_distance_m: 0.0,
                elevation_gain_m: 0.0,
                elevation_loss_m: 0.0,
                net_elevation_change_m: 0.0,
                original_point_count: 0,
                simplified_point_count: None,
                bounding_box: None,
                sol_range: None,
            },
            points: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TraverseAccumulator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Visit {
    point: Point3,
    first_sol: Sol,
    last_sol: Sol,
}

/// Incremental deduplication of positions, fed one batch at a time.
#[derive(Debug, Default)]
pub struct TraverseAccumulator {
    index: HashMap<PositionKey, usize>,
    visits: Vec<Visit>,
    records_seen: usize,
}

impl TraverseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record in.  Records without a position are ignored.
    pub fn push(&mut self, record: &TelemetryRecord) {
        self.records_seen += 1;
        let Some(position) = record.position.as_ref() else {
            return;
        };
        let key = PositionKey::from_position(position);
        match self.index.get(&key) {
            Some(&i) => {
                let visit = &mut self.visits[i];
                visit.first_sol = visit.first_sol.min(record.sol);
                visit.last_sol = visit.last_sol.max(record.sol);
            }
            None => {
                self.index.insert(key, self.visits.len());
                self.visits.push(Visit {
                    point: key.point(),
                    first_sol: record.sol,
                    last_sol: record.sol,
                });
            }
        }
    }

    pub fn extend<'a, I: IntoIterator<Item = &'a TelemetryRecord>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }

    /// Number of distinct (rounded) positions seen so far.
    pub fn unique_points(&self) -> usize {
        self.visits.len()
    }

    /// Number of records folded in, with or without a position.
    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Order, optionally simplify, and measure the path.
    pub fn finish(self, options: &TraverseOptions) -> TraverseResult {
        let mut visits = self.visits;
        if visits.is_empty() {
            return TraverseResult::empty();
        }
        // Stable: equal first sols keep first-seen order.
        visits.sort_by_key(|v| v.first_sol);

        let original_point_count = visits.len();
        let sol_range = visits
            .iter()
            .fold(None::<(Sol, Sol)>, |acc, v| match acc {
                None => Some((v.first_sol, v.last_sol)),
                Some((lo, hi)) => Some((lo.min(v.first_sol), hi.max(v.last_sol))),
            })
            .map(|(lo, hi)| SolRange::new(lo, hi));

        let (visits, simplified_point_count) =
            if options.simplify_tolerance_m > 0.0 && original_point_count > 2 {
                let pts: Vec<Point3> = visits.iter().map(|v| v.point).collect();
                let kept: Vec<Visit> = simplify_indices(&pts, options.simplify_tolerance_m)
                    .into_iter()
                    .map(|i| visits[i])
                    .collect();
                let n = kept.len();
                (kept, Some(n))
            } else {
                (visits, None)
            };

        let walk = walk(&visits, options.include_segments);

        debug!(
            records = self.records_seen,
            unique = original_point_count,
            emitted = walk.points.len(),
            total_distance_m = walk.total,
            "traverse built"
        );

        TraverseResult {
            summary: TraverseSummary {
                total_distance_m: walk.total,
                elevation_gain_m: walk.gain,
                elevation_loss_m: walk.loss,
                net_elevation_change_m: walk.net,
                original_point_count,
                simplified_point_count,
                bounding_box: walk.bbox,
                sol_range,
            },
            points: walk.points,
        }
    }
}

struct Walk {
    points: Vec<TraversePoint>,
    total: f64,
    gain: f64,
    loss: f64,
    net: f64,
    bbox: Option<BoundingBox>,
}

fn walk(visits: &[Visit], include_segments: bool) -> Walk {
    let mut points = Vec::with_capacity(visits.len());
    let mut total = 0.0_f64;
    let mut gain = 0.0_f64;
    let mut loss = 0.0_f64;
    let mut bbox: Option<BoundingBox> = None;
    let mut prev: Option<Point3> = None;

    for visit in visits {
        let p = visit.point;
        let segment = prev.map(|q| {
            let distance_m = distance_3d(q, p);
            let elevation_change_m = p.z - q.z;
            total += distance_m;
            if elevation_change_m > 0.0 {
                gain += elevation_change_m;
            } else {
                loss += -elevation_change_m;
            }
            Segment {
                distance_m,
                bearing_deg: bearing_2d(q, p),
                elevation_change_m,
            }
        });

        match bbox.as_mut() {
            Some(b) => b.expand(p),
            None => bbox = Some(BoundingBox::from_point(p)),
        }

        points.push(TraversePoint {
            x: p.x,
            y: p.y,
            z: p.z,
            first_sol: visit.first_sol,
            last_sol: visit.last_sol,
            cumulative_distance_m: total,
            segment: segment.filter(|_| include_segments),
        });
        prev = Some(p);
    }

    let net = match (visits.first(), visits.last()) {
        (Some(a), Some(b)) => b.point.z - a.point.z,
        _ => 0.0,
    };

    Walk {
        points,
        total,
        gain,
        loss,
        net,
        bbox,
    }
}

/// Build a traverse from `records` in one shot.
pub fn build(records: &[TelemetryRecord], options: &TraverseOptions) -> TraverseResult {
    let mut acc = TraverseAccumulator::new();
    acc.extend(records);
    acc.finish(options)
}
