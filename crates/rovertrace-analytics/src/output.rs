//! Serde helpers that round at serialization time.
//!
//! Results are accumulated and stored at full precision; only their
//! serialized form is rounded.

use rovertrace_geometry::{BoundingBox, Point3, round_to};
use serde::{Serialize, Serializer};

pub(crate) fn round1<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*v, 1))
}

pub(crate) fn round2<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*v, 2))
}

pub(crate) fn rounded_point(p: Point3, decimals: u32) -> Point3 {
    Point3::new(
        round_to(p.x, decimals),
        round_to(p.y, decimals),
        round_to(p.z, decimals),
    )
}

pub(crate) fn bbox2<S: Serializer>(v: &Option<BoundingBox>, s: S) -> Result<S::Ok, S::Error> {
    v.map(|b| BoundingBox {
        min: rounded_point(b.min, 2),
        max: rounded_point(b.max, 2),
    })
    .serialize(s)
}
