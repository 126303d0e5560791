//! `rovertrace-types` – shared telemetry vocabulary.
//!
//! Every crate in the workspace speaks in terms of the types defined here:
//!
//! - [`RawTelemetry`] – the delimited-text shape handed over by the ingestion
//!   collaborator (positions as `"(x,y,z)"`, angles and clocks as strings).
//! - [`TelemetryRecord`] – the typed, validated record.  Raw fields are parsed
//!   exactly once, in [`TelemetryRecord::from_raw`]; detector loops never see
//!   text.
//! - [`Position`], [`SolRange`], [`PanoramaId`] – small value types used in
//!   queries and results.
//! - [`AnalyticsError`], [`SourceError`], [`ParseError`] – error enums.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Martian solar day index, the primary mission time axis.
pub type Sol = u32;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Failure to parse a single string-encoded telemetry field.
///
/// Never surfaces to API callers: [`TelemetryRecord::from_raw`] maps every
/// `ParseError` to an absent field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected 3 comma-separated components, found {found}")]
    ComponentCount { found: usize },

    #[error("invalid {field} value: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} value {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Failure reported by a telemetry storage backend.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Telemetry backend failure: {0}")]
    Backend(String),
}

/// Errors visible to callers of the analytics engine.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid panorama id: {0:?}")]
    InvalidPanoramaId(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Query cancelled after {completed_sols} sol batch(es)")]
    Cancelled { completed_sols: u32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Position
// ────────────────────────────────────────────────────────────────────────────

/// Vehicle position in metres relative to the mission-defined origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl FromStr for Position {
    type Err = ParseError;

    /// Parse the `"(x,y,z)"` encoding.  Parentheses and whitespace are
    /// optional; exactly three finite components are required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed.strip_prefix('(').unwrap_or(trimmed);
        let inner = inner.strip_suffix(')').unwrap_or(inner);

        let parts: Vec<&str> = inner.split(',').collect();
        if parts.len() != 3 {
            return Err(ParseError::ComponentCount { found: parts.len() });
        }

        let mut xyz = [0.0_f64; 3];
        for (slot, part) in xyz.iter_mut().zip(&parts) {
            *slot = parse_finite("position", part)?;
        }
        Ok(Self::new(xyz[0], xyz[1], xyz[2]))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field parsers
// ────────────────────────────────────────────────────────────────────────────

fn parse_finite(field: &'static str, raw: &str) -> Result<f64, ParseError> {
    let value: f64 = raw.trim().parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ParseError::InvalidNumber {
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn parse_bounded(field: &'static str, raw: &str, min: f64, max: f64) -> Result<f64, ParseError> {
    let value = parse_finite(field, raw)?;
    if value < min || value > max {
        return Err(ParseError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Parse a mast azimuth in degrees, accepted range `[0, 360]`.
pub fn parse_azimuth(raw: &str) -> Result<f64, ParseError> {
    parse_bounded("mast_az", raw, 0.0, 360.0)
}

/// Parse a mast elevation in degrees, accepted range `[-90, 90]`.
pub fn parse_elevation(raw: &str) -> Result<f64, ParseError> {
    parse_bounded("mast_el", raw, -90.0, 90.0)
}

/// Parse a spacecraft clock reading (seconds, any finite value).
pub fn parse_clock(raw: &str) -> Result<f64, ParseError> {
    parse_finite("spacecraft_clock", raw)
}

// ────────────────────────────────────────────────────────────────────────────
// Telemetry records
// ────────────────────────────────────────────────────────────────────────────

/// Telemetry as delivered by the ingestion collaborator: one image, with
/// location and pointing still encoded as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTelemetry {
    pub id: u64,
    pub vehicle: String,
    pub sol: Sol,
    /// Imaging device identifier, e.g. `"NAVCAM_LEFT"`.
    pub camera: String,
    #[serde(default)]
    pub site: Option<u32>,
    #[serde(default)]
    pub drive: Option<u32>,
    /// `"(x,y,z)"` in metres.
    #[serde(default)]
    pub xyz: Option<String>,
    #[serde(default)]
    pub mast_az: Option<String>,
    #[serde(default)]
    pub mast_el: Option<String>,
    #[serde(default)]
    pub spacecraft_clock: Option<String>,
    /// Local mean solar time, e.g. `"Sol-01000M14:22:03"`.
    #[serde(default)]
    pub local_time: Option<String>,
}

/// One captured image's telemetry, parsed and validated.
///
/// Every location, orientation and timing field is optional.  A record
/// lacking site, drive, azimuth, elevation or clock takes no part in panorama
/// detection but still contributes its position to a traverse path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub id: u64,
    pub vehicle: String,
    pub sol: Sol,
    pub camera: String,
    pub site: Option<u32>,
    pub drive: Option<u32>,
    pub position: Option<Position>,
    /// Mast azimuth in degrees, `[0, 360]`.
    pub mast_az: Option<f64>,
    /// Mast elevation in degrees, `[-90, 90]`.
    pub mast_el: Option<f64>,
    pub spacecraft_clock: Option<f64>,
    pub local_time: Option<String>,
}

impl TelemetryRecord {
    /// A record carrying identity only; attach the rest with the `with_*`
    /// builders.
    pub fn new(id: u64, vehicle: impl Into<String>, sol: Sol, camera: impl Into<String>) -> Self {
        Self {
            id,
            vehicle: vehicle.into(),
            sol,
            camera: camera.into(),
            site: None,
            drive: None,
            position: None,
            mast_az: None,
            mast_el: None,
            spacecraft_clock: None,
            local_time: None,
        }
    }

    /// Parse the string-encoded fields of `raw`.  Fields that fail to parse
    /// are dropped to `None`.
    pub fn from_raw(raw: RawTelemetry) -> Self {
        let position = raw.xyz.as_deref().and_then(|s| s.parse().ok());
        let mast_az = raw.mast_az.as_deref().and_then(|s| parse_azimuth(s).ok());
        let mast_el = raw.mast_el.as_deref().and_then(|s| parse_elevation(s).ok());
        let spacecraft_clock = raw
            .spacecraft_clock
            .as_deref()
            .and_then(|s| parse_clock(s).ok());
        let local_time = raw.local_time.filter(|t| !t.trim().is_empty());

        Self {
            id: raw.id,
            vehicle: raw.vehicle,
            sol: raw.sol,
            camera: raw.camera,
            site: raw.site,
            drive: raw.drive,
            position,
            mast_az,
            mast_el,
            spacecraft_clock,
            local_time,
        }
    }

    pub fn with_site_drive(mut self, site: u32, drive: u32) -> Self {
        self.site = Some(site);
        self.drive = Some(drive);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_pointing(mut self, azimuth_deg: f64, elevation_deg: f64) -> Self {
        self.mast_az = Some(azimuth_deg);
        self.mast_el = Some(elevation_deg);
        self
    }

    pub fn with_clock(mut self, spacecraft_clock: f64) -> Self {
        self.spacecraft_clock = Some(spacecraft_clock);
        self
    }

    pub fn with_local_time(mut self, local_time: impl Into<String>) -> Self {
        self.local_time = Some(local_time.into());
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SolRange
// ────────────────────────────────────────────────────────────────────────────

/// An inclusive range of sols.  Construction normalises so `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SolBounds")]
pub struct SolRange {
    pub start: Sol,
    pub end: Sol,
}

/// Wire form of [`SolRange`]; deserialization normalises through
/// [`SolRange::new`].
#[derive(Deserialize)]
struct SolBounds {
    start: Sol,
    end: Sol,
}

impl From<SolBounds> for SolRange {
    fn from(b: SolBounds) -> Self {
        SolRange::new(b.start, b.end)
    }
}

impl SolRange {
    pub fn new(a: Sol, b: Sol) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(sol: Sol) -> Self {
        Self::new(sol, sol)
    }

    pub fn contains(&self, sol: Sol) -> bool {
        sol >= self.start && sol <= self.end
    }

    /// Number of sols covered (always ≥ 1, saturating at `u32::MAX`).
    pub fn sol_count(&self) -> u32 {
        self.end.abs_diff(self.start).saturating_add(1)
    }

    /// Keep only the first `max_sols` sols of the range.
    pub fn truncated(self, max_sols: u32) -> Self {
        let range = Self::new(self.start, self.end);
        let max_sols = max_sols.max(1);
        if range.sol_count() <= max_sols {
            return range;
        }
        Self::new(range.start, range.start + (max_sols - 1))
    }

    pub fn iter(&self) -> RangeInclusive<Sol> {
        self.start..=self.end
    }
}

impl fmt::Display for SolRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PanoramaId
// ────────────────────────────────────────────────────────────────────────────

/// Stable identifier of a detected panorama: the vehicle, the sol, and the
/// sequence's ordinal among that sol's emitted panoramas.
///
/// Textual form is `"{vehicle}-{sol}-{index}"`, e.g. `"curiosity-1000-2"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PanoramaId {
    pub vehicle: String,
    pub sol: Sol,
    pub index: u32,
}

impl PanoramaId {
    pub fn new(vehicle: impl Into<String>, sol: Sol, index: u32) -> Self {
        Self {
            vehicle: vehicle.into(),
            sol,
            index,
        }
    }
}

impl fmt::Display for PanoramaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.vehicle, self.sol, self.index)
    }
}

impl FromStr for PanoramaId {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalyticsError::InvalidPanoramaId(s.to_string());

        // Split from the right: vehicle names may themselves contain '-'.
        let mut parts = s.trim().rsplitn(3, '-');
        let index = parts.next().ok_or_else(invalid)?;
        let sol = parts.next().ok_or_else(invalid)?;
        let vehicle = parts.next().ok_or_else(invalid)?;

        if vehicle.is_empty() {
            return Err(invalid());
        }
        let sol: Sol = sol.parse().map_err(|_| invalid())?;
        let index: u32 = index.parse().map_err(|_| invalid())?;
        Ok(Self::new(vehicle, sol, index))
    }
}

impl From<PanoramaId> for String {
    fn from(id: PanoramaId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for PanoramaId {
    type Error = AnalyticsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
