//! `rovertrace-geometry` – geometry primitives for traverse analytics.
//!
//! Pure functions over rover-local Cartesian coordinates (metres).  Nothing in
//! this crate allocates beyond its return values or touches I/O.
//!
//! # Modules
//!
//! - [`point`] – [`Point3`][point::Point3] and the componentwise
//!   [`BoundingBox`][point::BoundingBox].
//! - [`measure`] – [`distance_3d`][measure::distance_3d],
//!   [`bearing_2d`][measure::bearing_2d] and
//!   [`perpendicular_distance`][measure::perpendicular_distance].
//! - [`simplify`] – Douglas–Peucker polyline reduction in 3-space
//!   ([`simplify`][simplify::simplify],
//!   [`simplify_indices`][simplify::simplify_indices]).

pub mod measure;
pub mod point;
pub mod simplify;

pub use measure::{bearing_2d, distance_3d, perpendicular_distance, round_to};
pub use point::{BoundingBox, Point3};
pub use simplify::{simplify, simplify_indices};
