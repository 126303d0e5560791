//! Grouping and aggregation helpers shared by the panorama and traverse
//! analyses.

use std::collections::BTreeMap;

use rovertrace_geometry::Point3;
use rovertrace_types::Position;

/// Decimal places kept when collapsing near-duplicate positions (~1 cm).
pub const DEDUP_DECIMALS: u32 = 2;

const DEDUP_SCALE: f64 = 100.0;

/// Partition `items` by `key_fn`.
///
/// Groups iterate in ascending key order; within a group items keep the order
/// in which they were encountered.
pub fn group_ordered<T, K, I, F>(items: I, mut key_fn: F) -> BTreeMap<K, Vec<T>>
where
    K: Ord,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key_fn(&item)).or_default().push(item);
    }
    groups
}

/// Smallest and largest value, or `None` for an empty input.
pub fn min_max<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Arithmetic mean, or `None` for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

// ────────────────────────────────────────────────────────────────────────────
// PositionKey
// ────────────────────────────────────────────────────────────────────────────

/// A position rounded to [`DEDUP_DECIMALS`] places, held as integer
/// hundredths of a metre so that it hashes and compares exactly.
///
/// Two textual encodings of the same physical point (e.g. `"(1.001,2.002,3.003)"`
/// and `"(1.0009,2.0021,3.0029)"`) map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    x: i64,
    y: i64,
    z: i64,
}

impl PositionKey {
    pub fn from_position(p: &Position) -> Self {
        Self {
            x: quantise(p.x),
            y: quantise(p.y),
            z: quantise(p.z),
        }
    }

    /// The rounded coordinates as a point.
    pub fn point(&self) -> Point3 {
        Point3::new(
            self.x as f64 / DEDUP_SCALE,
            self.y as f64 / DEDUP_SCALE,
            self.z as f64 / DEDUP_SCALE,
        )
    }
}

fn quantise(v: f64) -> i64 {
    (v * DEDUP_SCALE).round() as i64
}
