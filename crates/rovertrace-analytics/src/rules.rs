//! [`SequenceValidator`] – acceptance rules for candidate panoramic sweeps.
//!
//! When the detector closes a candidate sweep it summarises the run as
//! [`SequenceStats`] and passes it through [`SequenceValidator::validate`].
//! Every registered [`SequenceRule`] is evaluated in order; the first
//! violation returns a [`Rejection`] and the candidate is **not** emitted.
//!
//! Two built-in rules are provided:
//! - [`MinPhotosRule`] – rejects sweeps with too few captures.
//! - [`AzimuthCoverageRule`] – rejects sweeps whose azimuth span
//!   (max − min) is too narrow to be a panorama.
//!
//! Rejections are ordinary outcomes, not failures; the detector only logs
//! them.

use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Inputs and outcomes
// ────────────────────────────────────────────────────────────────────────────

/// Summary of a closed candidate sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceStats {
    pub photo_count: usize,
    pub azimuth_min_deg: f64,
    pub azimuth_max_deg: f64,
    pub elevation_mean_deg: f64,
}

impl SequenceStats {
    /// Azimuth span covered by the sweep, `max − min`.
    pub fn azimuth_coverage_deg(&self) -> f64 {
        self.azimuth_max_deg - self.azimuth_min_deg
    }
}

/// Why a candidate sweep was not emitted.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{rule}: {reason}")]
pub struct Rejection {
    pub rule: String,
    pub reason: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Rule trait
// ────────────────────────────────────────────────────────────────────────────

/// A single acceptance criterion for a candidate sweep.
///
/// Implement this trait to add custom criteria to a [`SequenceValidator`]
/// via [`SequenceValidator::add_rule`].
pub trait SequenceRule: Send + Sync {
    /// Short name used in rejection messages.
    fn name(&self) -> &str;

    /// `Ok(())` when the sweep satisfies the criterion.
    fn check(&self, stats: &SequenceStats) -> Result<(), Rejection>;

    /// Build a [`Rejection`] attributed to this rule.
    fn reject(&self, reason: String) -> Rejection {
        Rejection {
            rule: self.name().to_string(),
            reason,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SequenceValidator
// ────────────────────────────────────────────────────────────────────────────

/// Ordered collection of [`SequenceRule`]s.
///
/// # Example
///
/// ```
/// use rovertrace_analytics::rules::{
///     AzimuthCoverageRule, MinPhotosRule, SequenceStats, SequenceValidator,
/// };
///
/// let mut validator = SequenceValidator::new();
/// validator.add_rule(Box::new(MinPhotosRule { min_photos: 3 }));
/// validator.add_rule(Box::new(AzimuthCoverageRule { min_coverage_deg: 30.0 }));
///
/// let wide = SequenceStats {
///     photo_count: 5,
///     azimuth_min_deg: 100.0,
///     azimuth_max_deg: 140.0,
///     elevation_mean_deg: -5.0,
/// };
/// assert!(validator.validate(&wide).is_ok());
///
/// let narrow = SequenceStats { azimuth_max_deg: 110.0, ..wide };
/// assert!(validator.validate(&narrow).is_err());
/// ```
#[derive(Default)]
pub struct SequenceValidator {
    rules: Vec<Box<dyn SequenceRule>>,
}

impl SequenceValidator {
    /// Create a validator with no rules; it accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.  Rules are evaluated in insertion order.
    pub fn add_rule(&mut self, rule: Box<dyn SequenceRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Check `stats` against every rule, returning the first rejection.
    pub fn validate(&self, stats: &SequenceStats) -> Result<(), Rejection> {
        for rule in &self.rules {
            rule.check(stats)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SequenceValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceValidator")
            .field("rules", &self.rule_names())
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in rules
// ────────────────────────────────────────────────────────────────────────────

/// Rejects sweeps with fewer than `min_photos` captures.
pub struct MinPhotosRule {
    pub min_photos: usize,
}

impl SequenceRule for MinPhotosRule {
    fn name(&self) -> &str {
        "min_photos"
    }

    fn check(&self, stats: &SequenceStats) -> Result<(), Rejection> {
        if stats.photo_count < self.min_photos {
            return Err(self.reject(format!(
                "{} photo(s) below minimum {}",
                stats.photo_count, self.min_photos
            )));
        }
        Ok(())
    }
}

/// Rejects sweeps whose azimuth coverage is below `min_coverage_deg`.
pub struct AzimuthCoverageRule {
    pub min_coverage_deg: f64,
}

impl SequenceRule for AzimuthCoverageRule {
    fn name(&self) -> &str {
        "azimuth_coverage"
    }

    fn check(&self, stats: &SequenceStats) -> Result<(), Rejection> {
        let coverage = stats.azimuth_coverage_deg();
        if coverage < self.min_coverage_deg {
            return Err(self.reject(format!(
                "coverage {coverage:.2}° below minimum {}°",
                self.min_coverage_deg
            )));
        }
        Ok(())
    }
}
