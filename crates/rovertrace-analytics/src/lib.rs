//! `rovertrace-analytics` – photographic and locomotive context from rover
//! telemetry.
//!
//! Operates purely on numeric and identifier fields of
//! [`TelemetryRecord`][rovertrace_types::TelemetryRecord]s; no pixel data is
//! ever read.
//!
//! # Modules
//!
//! - [`panorama`] – [`PanoramaDetector`][panorama::PanoramaDetector]: groups
//!   captures by (vehicle, sol, site, drive, camera) and splits each group into
//!   panoramic sweeps using pointing and clock continuity.
//! - [`rules`] – [`SequenceValidator`][rules::SequenceValidator]: the rule
//!   engine every closed candidate sweep must pass before it is emitted.
//! - [`traverse`] – [`TraverseAccumulator`][traverse::TraverseAccumulator]:
//!   deduplicates positions, orders them by first visit, optionally simplifies
//!   the path and computes distance, elevation and bearing statistics.
//! - [`geojson`] – single-polyline GeoJSON rendering of a traverse.
//! - [`grouping`] – ordered grouping and small aggregation helpers shared by
//!   both analyses.
//! - [`source`] – [`TelemetrySource`][source::TelemetrySource], the boundary
//!   to the storage collaborator, plus an in-memory implementation.
//! - [`engine`] – [`AnalyticsEngine`][engine::AnalyticsEngine]: runs both
//!   analyses one sol at a time over a bounded window, checking a
//!   [`CancellationToken`][cancel::CancellationToken] between batches.

pub mod cancel;
pub mod engine;
pub mod geojson;
pub mod grouping;
pub(crate) mod output;
pub mod panorama;
pub mod rules;
pub mod source;
pub mod traverse;

pub use cancel::CancellationToken;
pub use engine::{AnalyticsEngine, WindowPolicy};
pub use panorama::{PanoramaConfig, PanoramaDetector, PanoramaSequence, detect};
pub use rules::{AzimuthCoverageRule, MinPhotosRule, Rejection, SequenceRule, SequenceValidator};
pub use source::{InMemorySource, TelemetrySource};
pub use traverse::{
    Segment, TraverseAccumulator, TraverseOptions, TraversePoint, TraverseResult, TraverseSummary,
    build,
};
