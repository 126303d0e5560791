//! Panorama Sequence Detector.
//!
//! Finds the contiguous runs of images one camera took at one stop while
//! sweeping the mast across a wide azimuth range.
//!
//! # Algorithm
//!
//! 1. Keep only captures carrying site, drive, azimuth, elevation and clock.
//! 2. Partition by (vehicle, sol, site, drive, camera).  Groups smaller than
//!    `min_photos` are dropped before any further work.
//! 3. Sort each group by spacecraft clock.  Equal clocks are ordered by
//!    record id rather than by arrival order, so the same records produce the
//!    same sequences and ids however the input is shuffled.
//! 4. Walk the sorted group.  The open run's base elevation is fixed at its
//!    first member; a capture continues the run iff
//!
//!    ```text
//!    |elevation − base| ≤ max_elevation_drift_deg
//!    0 < clock − previous.clock ≤ max_clock_gap_s
//!    ```
//!
//!    Otherwise the run is closed and a new one starts.  A clock delta of
//!    exactly zero always breaks the run.
//! 5. Each closed run is summarised and passed through the
//!    [`SequenceValidator`]; accepted runs are emitted.
//!
//! Emitted sequences are numbered 0, 1, 2… per (vehicle, sol) in detection
//! order: groups in ascending (site, drive, camera) order, runs in clock
//! order.  The number never depends on content hashes, so repeated,
//! reordered or parallel runs over the same input assign identical ids.
//!
//! # Example
//!
//! ```rust
//! use rovertrace_analytics::panorama::detect;
//! use rovertrace_types::TelemetryRecord;
//!
//! let records: Vec<TelemetryRecord> = (0..5)
//!     .map(|i| {
//!         TelemetryRecord::new(i, "curiosity", 100, "MAST_LEFT")
//!             .with_site_drive(3, 40)
//!             .with_pointing(10.0 + 10.0 * i as f64, -2.0)
//!             .with_clock(1_000.0 + 100.0 * i as f64)
//!     })
//!     .collect();
//!
//! let panoramas = detect(&records, 3);
//! assert_eq!(panoramas.len(), 1);
//! assert_eq!(panoramas[0].id.to_string(), "curiosity-100-0");
//! assert_eq!(panoramas[0].photo_count, 5);
//! ```

use std::collections::HashMap;

use rovertrace_types::{PanoramaId, Position, Sol, TelemetryRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::grouping::{group_ordered, mean, min_max};
use crate::output::{round1, round2};
use crate::rules::{AzimuthCoverageRule, MinPhotosRule, SequenceRule, SequenceStats, SequenceValidator};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Thresholds for panorama detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoramaConfig {
    /// Minimum captures in an emitted sequence (clamped to ≥ 1).
    pub min_photos: usize,
    /// Minimum `max − min` azimuth of an emitted sequence, degrees.
    pub min_azimuth_coverage_deg: f64,
    /// Largest allowed elevation departure from the run's first capture.
    pub max_elevation_drift_deg: f64,
    /// Largest allowed spacecraft-clock gap between consecutive captures.
    pub max_clock_gap_s: f64,
}

impl Default for PanoramaConfig {
    fn default() -> Self {
        Self {
            min_photos: 3,
            min_azimuth_coverage_deg: 30.0,
            max_elevation_drift_deg: 2.0,
            max_clock_gap_s: 300.0,
        }
    }
}

impl PanoramaConfig {
    /// Default thresholds with a different `min_photos`.
    pub fn with_min_photos(min_photos: usize) -> Self {
        Self {
            min_photos,
            ..Self::default()
        }
    }

    /// The first angle or gap threshold that is negative or not finite.
    pub fn invalid_threshold(&self) -> Option<(&'static str, f64)> {
        [
            ("min_azimuth_coverage_deg", self.min_azimuth_coverage_deg),
            ("max_elevation_drift_deg", self.max_elevation_drift_deg),
            ("max_clock_gap_s", self.max_clock_gap_s),
        ]
        .into_iter()
        .find(|&(_, value)| !is_valid_threshold(value))
    }

    /// Copy with `min_photos` clamped to ≥ 1 and every invalid threshold
    /// replaced by its default.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            min_photos: self.min_photos.max(1),
            min_azimuth_coverage_deg: threshold_or(
                "min_azimuth_coverage_deg",
                self.min_azimuth_coverage_deg,
                defaults.min_azimuth_coverage_deg,
            ),
            max_elevation_drift_deg: threshold_or(
                "max_elevation_drift_deg",
                self.max_elevation_drift_deg,
                defaults.max_elevation_drift_deg,
            ),
            max_clock_gap_s: threshold_or(
                "max_clock_gap_s",
                self.max_clock_gap_s,
                defaults.max_clock_gap_s,
            ),
        }
    }
}

fn is_valid_threshold(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn threshold_or(name: &'static str, value: f64, fallback: f64) -> f64 {
    if is_valid_threshold(value) {
        return value;
    }
    warn!(threshold = name, value, fallback, "invalid panorama threshold replaced by default");
    fallback
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// A validated panoramic sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanoramaSequence {
    pub id: PanoramaId,
    pub vehicle: String,
    pub sol: Sol,
    pub site: u32,
    pub drive: u32,
    pub camera: String,
    pub photo_count: usize,
    #[serde(serialize_with = "round1")]
    pub azimuth_min_deg: f64,
    #[serde(serialize_with = "round1")]
    pub azimuth_max_deg: f64,
    #[serde(serialize_with = "round1")]
    pub azimuth_coverage_deg: f64,
    #[serde(serialize_with = "round2")]
    pub average_elevation_deg: f64,
    pub start_clock: f64,
    pub end_clock: f64,
    pub start_local_time: Option<String>,
    pub end_local_time: Option<String>,
    /// Position of the first capture.
    pub location: Option<Position>,
    /// Captures in ascending clock order.
    pub members: Vec<TelemetryRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Internal capture view
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    vehicle: String,
    sol: Sol,
    site: u32,
    drive: u32,
    camera: String,
}

/// A record with every field panorama detection needs, unwrapped.
#[derive(Debug, Clone, Copy)]
struct Capture<'a> {
    record: &'a TelemetryRecord,
    site: u32,
    drive: u32,
    azimuth: f64,
    elevation: f64,
    clock: f64,
}

impl<'a> Capture<'a> {
    fn from_record(record: &'a TelemetryRecord) -> Option<Self> {
        Some(Self {
            record,
            site: record.site?,
            drive: record.drive?,
            azimuth: record.mast_az?,
            elevation: record.mast_el?,
            clock: record.spacecraft_clock?,
        })
    }

    fn group_key(&self) -> GroupKey {
        GroupKey {
            vehicle: self.record.vehicle.clone(),
            sol: self.record.sol,
            site: self.site,
            drive: self.drive,
            camera: self.record.camera.clone(),
        }
    }
}

fn stats_of(run: &[Capture<'_>]) -> SequenceStats {
    let (azimuth_min_deg, azimuth_max_deg) =
        min_max(run.iter().map(|c| c.azimuth)).unwrap_or((0.0, 0.0));
    SequenceStats {
        photo_count: run.len(),
        azimuth_min_deg,
        azimuth_max_deg,
        elevation_mean_deg: mean(run.iter().map(|c| c.elevation)).unwrap_or(0.0),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PanoramaDetector
// ────────────────────────────────────────────────────────────────────────────

/// Splits telemetry into validated [`PanoramaSequence`]s.
///
/// Construct with [`PanoramaDetector::new`], optionally register extra
/// acceptance criteria with [`PanoramaDetector::add_rule`], then call
/// [`PanoramaDetector::detect`].
#[derive(Debug)]
pub struct PanoramaDetector {
    config: PanoramaConfig,
    validator: SequenceValidator,
}

impl PanoramaDetector {
    /// Create a detector whose validator enforces `config.min_photos` and
    /// `config.min_azimuth_coverage_deg`.  The config is
    /// [sanitized][PanoramaConfig::sanitized] first.
    pub fn new(config: PanoramaConfig) -> Self {
        let config = config.sanitized();
        let mut validator = SequenceValidator::new();
        validator.add_rule(Box::new(MinPhotosRule {
            min_photos: config.min_photos,
        }));
        validator.add_rule(Box::new(AzimuthCoverageRule {
            min_coverage_deg: config.min_azimuth_coverage_deg,
        }));
        Self { config, validator }
    }

    pub fn config(&self) -> &PanoramaConfig {
        &self.config
    }

    /// Register an additional acceptance rule, evaluated after the built-ins.
    pub fn add_rule(&mut self, rule: Box<dyn SequenceRule>) {
        self.validator.add_rule(rule);
    }

    /// Detect every panorama in `records`.
    ///
    /// Records may span several vehicles and sols and arrive in any order.
    pub fn detect(&self, records: &[TelemetryRecord]) -> Vec<PanoramaSequence> {
        let captures = records.iter().filter_map(Capture::from_record);
        let groups = group_ordered(captures, Capture::group_key);

        let mut ordinals: HashMap<(String, Sol), u32> = HashMap::new();
        let mut sequences = Vec::new();

        for (key, mut group) in groups {
            if group.len() < self.config.min_photos {
                trace!(?key, size = group.len(), "group below min_photos; skipped");
                continue;
            }

            group.sort_by(|a, b| {
                a.clock
                    .total_cmp(&b.clock)
                    .then_with(|| a.record.id.cmp(&b.record.id))
            });

            for run in self.split_runs(&group) {
                let stats = stats_of(run);
                if let Err(rejection) = self.validator.validate(&stats) {
                    trace!(?key, %rejection, "candidate sweep rejected");
                    continue;
                }
                let ordinal = ordinals.entry((key.vehicle.clone(), key.sol)).or_insert(0);
                let id = PanoramaId::new(key.vehicle.clone(), key.sol, *ordinal);
                *ordinal += 1;
                sequences.push(assemble(id, &key, run, &stats));
            }
        }

        debug!(
            records = records.len(),
            panoramas = sequences.len(),
            "panorama detection finished"
        );
        sequences
    }

    /// Cut a clock-sorted group into maximal continuous runs.
    fn split_runs<'g, 'r>(&self, group: &'g [Capture<'r>]) -> Vec<&'g [Capture<'r>]> {
        let mut runs = Vec::new();
        if group.is_empty() {
            return runs;
        }

        let mut start = 0;
        for i in 1..group.len() {
            if !self.continues(&group[start], &group[i - 1], &group[i]) {
                runs.push(&group[start..i]);
                start = i;
            }
        }
        runs.push(&group[start..]);
        runs
    }

    fn continues(&self, first: &Capture<'_>, last: &Capture<'_>, next: &Capture<'_>) -> bool {
        let elevation_diff = (next.elevation - first.elevation).abs();
        let time_delta = next.clock - last.clock;
        elevation_diff <= self.config.max_elevation_drift_deg
            && time_delta > 0.0
            && time_delta <= self.config.max_clock_gap_s
    }
}

impl Default for PanoramaDetector {
    fn default() -> Self {
        Self::new(PanoramaConfig::default())
    }
}

fn assemble(
    id: PanoramaId,
    key: &GroupKey,
    run: &[Capture<'_>],
    stats: &SequenceStats,
) -> PanoramaSequence {
    // Runs handed to assemble are validated and therefore non-empty.
    let first = &run[0];
    let last = &run[run.len() - 1];
    PanoramaSequence {
        id,
        vehicle: key.vehicle.clone(),
        sol: key.sol,
        site: key.site,
        drive: key.drive,
        camera: key.camera.clone(),
        photo_count: run.len(),
        azimuth_min_deg: stats.azimuth_min_deg,
        azimuth_max_deg: stats.azimuth_max_deg,
        azimuth_coverage_deg: stats.azimuth_coverage_deg(),
        average_elevation_deg: stats.elevation_mean_deg,
        start_clock: first.clock,
        end_clock: last.clock,
        start_local_time: first.record.local_time.clone(),
        end_local_time: last.record.local_time.clone(),
        location: first.record.position,
        members: run.iter().map(|c| c.record.clone()).collect(),
    }
}

/// Detect panoramas with default thresholds and the given `min_photos`.
pub fn detect(records: &[TelemetryRecord], min_photos: usize) -> Vec<PanoramaSequence> {
    PanoramaDetector::new(PanoramaConfig::with_min_photos(min_photos)).detect(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rejection;

    const VEHICLE: &str = "curiosity";

    fn capture(id: u64, sol: Sol, camera: &str, az: f64, el: f64, clock: f64) -> TelemetryRecord {
        TelemetryRecord::new(id, VEHICLE, sol, camera)
            .with_site_drive(7, 1200)
            .with_pointing(az, el)
            .with_clock(clock)
    }

    /// Five captures, elevations within 1°, clocks 0..400 step 100, azimuths
    /// spanning 40°.
    fn sweep(first_id: u64, sol: Sol, camera: &str, clock0: f64) -> Vec<TelemetryRecord> {
        (0..5)
            .map(|i| {
                capture(
                    first_id + i,
                    sol,
                    camera,
                    100.0 + 10.0 * i as f64,
                    -3.0 + 0.2 * i as f64,
                    clock0 + 100.0 * i as f64,
                )
            })
            .collect()
    }

    fn member_ids(seq: &PanoramaSequence) -> Vec<u64> {
        seq.members.iter().map(|m| m.id).collect()
    }

    #[test]
    fn five_photo_sweep_yields_one_sequence() {
        let records = sweep(1, 500, "MAST_LEFT", 0.0);
        let found = detect(&records, 3);
        assert_eq!(found.len(), 1);
        let seq = &found[0];
        assert_eq!(seq.photo_count, 5);
        assert_eq!(seq.id, PanoramaId::new(VEHICLE, 500, 0));
        assert!((seq.azimuth_coverage_deg - 40.0).abs() < 1e-9);
        assert!((seq.average_elevation_deg - (-2.6)).abs() < 1e-9);
        assert_eq!(seq.start_clock, 0.0);
        assert_eq!(seq.end_clock, 400.0);
        assert_eq!((seq.site, seq.drive), (7, 1200));
    }

    #[test]
    fn empty_input_yields_no_sequences() {
        assert!(detect(&[], 3).is_empty());
    }

    #[test]
    fn records_missing_orientation_or_clock_are_ignored() {
        let mut records = sweep(1, 10, "MAST_LEFT", 0.0);
        records.push(TelemetryRecord::new(99, VEHICLE, 10, "MAST_LEFT").with_site_drive(7, 1200));
        records[4].spacecraft_clock = None;
        let found = detect(&records, 3);
        assert_eq!(found.len(), 1);
        assert_eq!(member_ids(&found[0]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn records_missing_site_or_drive_are_ignored() {
        let mut records = sweep(1, 10, "MAST_LEFT", 0.0);
        for r in &mut records {
            r.site = None;
        }
        assert!(detect(&records, 3).is_empty());
    }

    #[test]
    fn equal_clocks_never_share_a_sequence() {
        // Ids 3 and 4 share clock 200.
        let clocks = [0.0, 100.0, 200.0, 200.0, 300.0, 400.0];
        let records: Vec<TelemetryRecord> = clocks
            .iter()
            .enumerate()
            .map(|(i, &clock)| capture(i as u64 + 1, 10, "MAST_LEFT", 20.0 * i as f64, -3.0, clock))
            .collect();
        let found = detect(&records, 2);
        for seq in &found {
            let clocks: Vec<f64> = seq.members.iter().filter_map(|m| m.spacecraft_clock).collect();
            assert!(clocks.windows(2).all(|w| w[1] > w[0]), "clocks must strictly increase");
        }
        assert_eq!(found.len(), 2);
        assert_eq!(member_ids(&found[0]), vec![1, 2, 3]);
        assert_eq!(member_ids(&found[1]), vec![4, 5, 6]);
    }

    #[test]
    fn clock_gap_over_limit_splits_the_run() {
        let mut records = sweep(1, 10, "MAST_LEFT", 0.0);
        records.extend(sweep(10, 10, "MAST_LEFT", 400.0 + 301.0));
        let found = detect(&records, 3);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id.index, 0);
        assert_eq!(found[1].id.index, 1);
    }

    #[test]
    fn clock_gap_at_limit_continues_the_run() {
        let mut records = sweep(1, 10, "MAST_LEFT", 0.0);
        records.extend(sweep(10, 10, "MAST_LEFT", 400.0 + 300.0));
        let found = detect(&records, 3);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].photo_count, 10);
    }

    #[test]
    fn elevation_drift_is_measured_from_the_first_member() {
        // Each step is only 0.8°, but capture 3 is 2.4° above capture 0.
        let records: Vec<TelemetryRecord> = (0..6)
            .map(|i| capture(i, 10, "MAST_LEFT", 20.0 * i as f64, 0.8 * i as f64, 10.0 * i as f64))
            .collect();
        let found = detect(&records, 3);
        assert_eq!(found.len(), 2);
        assert_eq!(member_ids(&found[0]), vec![0, 1, 2]);
        assert_eq!(member_ids(&found[1]), vec![3, 4, 5]);
    }

    #[test]
    fn elevation_drift_at_limit_continues_the_run() {
        let elevations = [10.0, 11.0, 12.0, 8.0];
        let records: Vec<TelemetryRecord> = elevations
            .iter()
            .enumerate()
            .map(|(i, &el)| capture(i as u64, 10, "MAST_LEFT", 20.0 * i as f64, el, 10.0 * i as f64))
            .collect();
        let found = detect(&records, 3);
        assert_eq!(found.len(), 1);
        assert_eq!(member_ids(&found[0]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn elevation_drift_just_over_limit_splits_the_run() {
        let elevations = [10.0, 11.0, 12.0, 12.001, 11.5, 11.0];
        let records: Vec<TelemetryRecord> = elevations
            .iter()
            .enumerate()
            .map(|(i, &el)| capture(i as u64, 10, "MAST_LEFT", 20.0 * i as f64, el, 10.0 * i as f64))
            .collect();
        let found = detect(&records, 3);
        assert_eq!(found.len(), 2);
        assert_eq!(member_ids(&found[0]), vec![0, 1, 2]);
        assert_eq!(member_ids(&found[1]), vec![3, 4, 5]);
    }

    fn flat_sweep() -> Vec<TelemetryRecord> {
        (0..3)
            .map(|i| capture(i, 10, "MAST_LEFT", 0.0, 0.0, 10.0 * i as f64))
            .collect()
    }

    #[test]
    fn nan_coverage_falls_back_to_default() {
        let detector = PanoramaDetector::new(PanoramaConfig {
            min_azimuth_coverage_deg: f64::NAN,
            ..PanoramaConfig::default()
        });
        assert_eq!(detector.config().min_azimuth_coverage_deg, 30.0);
        assert!(detector.detect(&flat_sweep()).is_empty());
    }

    #[test]
    fn negative_coverage_falls_back_to_default() {
        let detector = PanoramaDetector::new(PanoramaConfig {
            min_azimuth_coverage_deg: -5.0,
            ..PanoramaConfig::default()
        });
        assert_eq!(detector.config().min_azimuth_coverage_deg, 30.0);
        assert!(detector.detect(&flat_sweep()).is_empty());
    }

    #[test]
    fn invalid_gap_and_drift_fall_back_to_defaults() {
        let config = PanoramaConfig {
            max_elevation_drift_deg: -1.0,
            max_clock_gap_s: f64::INFINITY,
            ..PanoramaConfig::default()
        };
        assert_eq!(config.invalid_threshold(), Some(("max_elevation_drift_deg", -1.0)));

        let detector = PanoramaDetector::new(config);
        assert_eq!(detector.config(), &PanoramaConfig::default());
        assert_eq!(detector.config().invalid_threshold(), None);
    }

    #[test]
    fn narrow_sweeps_are_rejected() {
        let records: Vec<TelemetryRecord> = (0..5)
            .map(|i| capture(i, 10, "MAST_LEFT", 100.0 + 7.0 * i as f64, 0.0, 10.0 * i as f64))
            .collect();
        // Coverage 28° < 30°.
        assert!(detect(&records, 3).is_empty());
    }

    #[test]
    fn groups_smaller_than_min_photos_are_skipped() {
        let records = sweep(1, 10, "MAST_LEFT", 0.0);
        assert!(detect(&records, 6).is_empty());
        assert_eq!(detect(&records, 5).len(), 1);
    }

    #[test]
    fn min_photos_zero_is_clamped_to_one() {
        let detector = PanoramaDetector::new(PanoramaConfig::with_min_photos(0));
        assert_eq!(detector.config().min_photos, 1);
    }

    #[test]
    fn cameras_and_stops_form_separate_groups() {
        let mut records = sweep(1, 10, "MAST_RIGHT", 0.0);
        records.extend(sweep(10, 10, "MAST_LEFT", 0.0));
        let mut other_stop = sweep(20, 10, "MAST_LEFT", 0.0);
        for r in &mut other_stop {
            r.drive = Some(1300);
        }
        records.extend(other_stop);

        let found = detect(&records, 3);
        assert_eq!(found.len(), 3);
        // Ordered by (site, drive, camera): 1200/LEFT, 1200/RIGHT, 1300/LEFT.
        let order: Vec<(u32, &str, u32)> = found
            .iter()
            .map(|s| (s.drive, s.camera.as_str(), s.id.index))
            .collect();
        assert_eq!(
            order,
            vec![(1200, "MAST_LEFT", 0), (1200, "MAST_RIGHT", 1), (1300, "MAST_LEFT", 2)]
        );
    }

    #[test]
    fn ordinals_restart_for_each_sol() {
        let mut records = sweep(1, 10, "MAST_LEFT", 0.0);
        records.extend(sweep(10, 11, "MAST_LEFT", 0.0));
        let found = detect(&records, 3);
        let ids: Vec<String> = found.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["curiosity-10-0", "curiosity-11-0"]);
    }

    #[test]
    fn reordered_input_yields_identical_ids_and_membership() {
        let mut records = sweep(1, 10, "MAST_LEFT", 0.0);
        records.extend(sweep(10, 10, "MAST_LEFT", 2_000.0));
        records.extend(sweep(20, 10, "MAST_RIGHT", 0.0));
        records.push(capture(30, 10, "MAST_LEFT", 120.0, -3.0, 200.0));

        let baseline: Vec<(PanoramaId, Vec<u64>)> = detect(&records, 3)
            .iter()
            .map(|s| (s.id.clone(), member_ids(s)))
            .collect();
        assert_eq!(baseline.len(), 2);

        let mut shuffled = records.clone();
        shuffled.reverse();
        shuffled.rotate_left(7);
        let again: Vec<(PanoramaId, Vec<u64>)> = detect(&shuffled, 3)
            .iter()
            .map(|s| (s.id.clone(), member_ids(s)))
            .collect();

        assert_eq!(baseline, again);
    }

    #[test]
    fn every_emitted_sequence_meets_thresholds() {
        let mut records = Vec::new();
        for (n, camera) in ["A", "B", "C"].iter().enumerate() {
            for i in 0..12 {
                let jitter = ((i * 7 + n * 3) % 5) as f64;
                records.push(capture(
                    (n * 100 + i) as u64,
                    10,
                    camera,
                    (i as f64 * 9.0 + jitter) % 360.0,
                    jitter * 0.6,
                    i as f64 * 50.0 + jitter * 40.0,
                ));
            }
        }
        for seq in detect(&records, 3) {
            assert!(seq.photo_count >= 3);
            assert!(seq.azimuth_coverage_deg >= 30.0);
            assert!(seq.members.iter().all(|m| m.camera == seq.camera && m.sol == seq.sol));
        }
    }

    #[test]
    fn location_and_local_times_come_from_endpoints() {
        let mut records = sweep(1, 10, "MAST_LEFT", 0.0);
        records[0].position = Some(Position::new(1.0, 2.0, 3.0));
        records[0].local_time = Some("Sol-00010M10:00:00".into());
        records[4].local_time = Some("Sol-00010M10:06:40".into());
        let seq = &detect(&records, 3)[0];
        assert_eq!(seq.location, Some(Position::new(1.0, 2.0, 3.0)));
        assert_eq!(seq.start_local_time.as_deref(), Some("Sol-00010M10:00:00"));
        assert_eq!(seq.end_local_time.as_deref(), Some("Sol-00010M10:06:40"));
    }

    struct MaxPhotosRule(usize);

    impl SequenceRule for MaxPhotosRule {
        fn name(&self) -> &str {
            "max_photos"
        }

        fn check(&self, stats: &SequenceStats) -> Result<(), Rejection> {
            if stats.photo_count > self.0 {
                return Err(self.reject(format!("{} photos", stats.photo_count)));
            }
            Ok(())
        }
    }

    #[test]
    fn custom_rules_can_veto_sequences() {
        let records = sweep(1, 10, "MAST_LEFT", 0.0);
        let mut detector = PanoramaDetector::default();
        detector.add_rule(Box::new(MaxPhotosRule(4)));
        assert!(detector.detect(&records).is_empty());
    }

    #[test]
    fn serialized_sequence_uses_string_id_and_rounded_angles() {
        let mut records = sweep(1, 10, "MAST_LEFT", 0.0);
        records[1].mast_az = Some(110.04);
        let seq = &detect(&records, 3)[0];
        let json = serde_json::to_value(seq).unwrap();
        assert_eq!(json["id"], "curiosity-10-0");
        assert_eq!(json["photo_count"], 5);
        assert_eq!(json["azimuth_coverage_deg"], 40.0);
        assert_eq!(json["members"].as_array().unwrap().len(), 5);
    }
}
