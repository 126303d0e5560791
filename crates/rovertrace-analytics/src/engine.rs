//! [`AnalyticsEngine`] – sol-batched execution of both analyses.
//!
//! Every query is bounded by a sol window and processed one sol at a time:
//!
//! - **Panoramas** are keyed by sol, so each sol is detected independently
//!   and the per-sol ids are exactly those a single-sol lookup would assign.
//! - **Traverses** stream each sol's records into a
//!   [`TraverseAccumulator`], keeping one entry per unique position rather
//!   than every record.
//!
//! A [`CancellationToken`] is checked before each batch.
//!
//! # Window resolution
//!
//! | Request | Window |
//! |---------|--------|
//! | explicit range | intersected with the vehicle's sol bounds, then truncated to `max_window_sols` |
//! | none | the last `default_window_sols` sols ending at the vehicle's latest sol |
//!
//! A vehicle with no telemetry, or an explicit range outside its bounds,
//! resolves to no window and yields an empty result.
//!
//! # Example
//!
//! ```rust
//! use rovertrace_analytics::{AnalyticsEngine, CancellationToken, InMemorySource, TraverseOptions};
//! use rovertrace_types::{Position, TelemetryRecord};
//!
//! let source = InMemorySource::from_records([
//!     TelemetryRecord::new(1, "spirit", 1, "NAV").with_position(Position::new(0.0, 0.0, 0.0)),
//!     TelemetryRecord::new(2, "spirit", 2, "NAV").with_position(Position::new(0.0, 8.0, 6.0)),
//! ]);
//! let engine = AnalyticsEngine::new(source);
//!
//! let result = engine
//!     .traverse("spirit", None, &TraverseOptions::default(), &CancellationToken::new())
//!     .unwrap();
//! assert!((result.summary.total_distance_m - 10.0).abs() < 1e-9);
//! ```

use rovertrace_types::{AnalyticsError, PanoramaId, SolRange};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::cancel::CancellationToken;
use crate::panorama::{PanoramaConfig, PanoramaDetector, PanoramaSequence};
use crate::source::TelemetrySource;
use crate::traverse::{TraverseAccumulator, TraverseOptions, TraverseResult};

/// Bounds on how many sols a single query may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPolicy {
    /// Sols examined when the caller gives no range.
    pub default_window_sols: u32,
    /// Upper limit on an explicit range.
    pub max_window_sols: u32,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            default_window_sols: 50,
            max_window_sols: 1000,
        }
    }
}

/// Runs panorama detection and traverse building against a
/// [`TelemetrySource`].
#[derive(Debug)]
pub struct AnalyticsEngine<S> {
    source: S,
    policy: WindowPolicy,
}

impl<S: TelemetrySource> AnalyticsEngine<S> {
    pub fn new(source: S) -> Self {
        Self::with_policy(source, WindowPolicy::default())
    }

    pub fn with_policy(source: S, policy: WindowPolicy) -> Self {
        Self { source, policy }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    /// Resolve the sol window a query for `vehicle` will scan.
    pub fn resolve_window(
        &self,
        vehicle: &str,
        requested: Option<SolRange>,
    ) -> Result<Option<SolRange>, AnalyticsError> {
        let Some(bounds) = self.source.sol_bounds(vehicle)? else {
            return Ok(None);
        };

        let window = match requested {
            Some(range) => {
                if range.end < bounds.start || range.start > bounds.end {
                    return Ok(None);
                }
                let clipped = SolRange::new(range.start.max(bounds.start), range.end.min(bounds.end));
                let truncated = clipped.truncated(self.policy.max_window_sols);
                if truncated != clipped {
                    warn!(
                        vehicle,
                        requested = %clipped,
                        scanned = %truncated,
                        max_window_sols = self.policy.max_window_sols,
                        "sol range truncated"
                    );
                }
                truncated
            }
            None => {
                let span = self.policy.default_window_sols.max(1);
                let start = bounds.end.saturating_sub(span - 1).max(bounds.start);
                SolRange::new(start, bounds.end)
            }
        };
        Ok(Some(window))
    }

    /// Detect every panorama of `vehicle` inside the resolved window, in sol
    /// order.
    #[instrument(skip(self, config, cancel), fields(vehicle = %vehicle))]
    pub fn panoramas(
        &self,
        vehicle: &str,
        requested: Option<SolRange>,
        config: &PanoramaConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<PanoramaSequence>, AnalyticsError> {
        let Some(window) = self.resolve_window(vehicle, requested)? else {
            debug!("no telemetry in window");
            return Ok(Vec::new());
        };

        let detector = PanoramaDetector::new(config.clone());
        let mut found = Vec::new();
        let mut completed = 0_u32;
        for sol in window.iter() {
            cancel.check(completed)?;
            let records = self.source.records_for_sol(vehicle, sol)?;
            let batch = detector.detect(&records);
            debug!(sol, records = records.len(), panoramas = batch.len(), "sol batch");
            found.extend(batch);
            completed += 1;
        }

        debug!(%window, panoramas = found.len(), "panorama query finished");
        Ok(found)
    }

    /// Look up one panorama by its textual id.
    ///
    /// A malformed id or an index past the sol's last panorama is a lookup
    /// miss (`Ok(None)`), not an error.
    #[instrument(skip(self, config))]
    pub fn panorama(
        &self,
        id: &str,
        config: &PanoramaConfig,
    ) -> Result<Option<PanoramaSequence>, AnalyticsError> {
        let Ok(id) = id.parse::<PanoramaId>() else {
            debug!("unparseable panorama id");
            return Ok(None);
        };

        let records = self.source.records_for_sol(&id.vehicle, id.sol)?;
        let detector = PanoramaDetector::new(config.clone());
        Ok(detector
            .detect(&records)
            .into_iter()
            .find(|seq| seq.id == id))
    }

    /// Build the traverse of `vehicle` over the resolved window.
    #[instrument(skip(self, options, cancel), fields(vehicle = %vehicle))]
    pub fn traverse(
        &self,
        vehicle: &str,
        requested: Option<SolRange>,
        options: &TraverseOptions,
        cancel: &CancellationToken,
    ) -> Result<TraverseResult, AnalyticsError> {
        let Some(window) = self.resolve_window(vehicle, requested)? else {
            debug!("no telemetry in window");
            return Ok(TraverseResult::empty());
        };

        let mut acc = TraverseAccumulator::new();
        let mut completed = 0_u32;
        for sol in window.iter() {
            cancel.check(completed)?;
            let records = self.source.records_for_sol(vehicle, sol)?;
            acc.extend(&records);
            completed += 1;
        }
        debug!(
            %window,
            records = acc.records_seen(),
            unique = acc.unique_points(),
            "traverse batches folded"
        );
        Ok(acc.finish(options))
    }
}
