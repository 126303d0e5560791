//! Boundary to the telemetry storage collaborator.
//!
//! The engine never loads a mission's telemetry wholesale; it asks a
//! [`TelemetrySource`] for one (vehicle, sol) slice at a time.  Production
//! deployments back this trait with the mission database, where vehicle and
//! sol filtering happen at the query level.  [`InMemorySource`] serves
//! already-parsed records and is what the CLI and the tests use.

use std::collections::{BTreeMap, HashMap};

use rovertrace_types::{Sol, SolRange, SourceError, TelemetryRecord};

/// Read access to parsed telemetry, sliced by vehicle and sol.
pub trait TelemetrySource: Send + Sync {
    /// First and last sol for which `vehicle` has any telemetry, or `None`
    /// when the vehicle is unknown.
    fn sol_bounds(&self, vehicle: &str) -> Result<Option<SolRange>, SourceError>;

    /// All records of `vehicle` on `sol`, in any order.
    fn records_for_sol(&self, vehicle: &str, sol: Sol) -> Result<Vec<TelemetryRecord>, SourceError>;
}

/// Records indexed as vehicle → sol → records.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    by_vehicle: HashMap<String, BTreeMap<Sol, Vec<TelemetryRecord>>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I: IntoIterator<Item = TelemetryRecord>>(records: I) -> Self {
        let mut source = Self::new();
        for record in records {
            source.insert(record);
        }
        source
    }

    pub fn insert(&mut self, record: TelemetryRecord) {
        self.by_vehicle
            .entry(record.vehicle.clone())
            .or_default()
            .entry(record.sol)
            .or_default()
            .push(record);
    }

    /// Vehicle names, sorted.
    pub fn vehicles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_vehicle.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn record_count(&self) -> usize {
        self.by_vehicle
            .values()
            .flat_map(|sols| sols.values())
            .map(Vec::len)
            .sum()
    }
}

impl TelemetrySource for InMemorySource {
    fn sol_bounds(&self, vehicle: &str) -> Result<Option<SolRange>, SourceError> {
        let Some(sols) = self.by_vehicle.get(vehicle) else {
            return Ok(None);
        };
        let first = sols.keys().next().copied();
        let last = sols.keys().next_back().copied();
        Ok(first.zip(last).map(|(a, b)| SolRange::new(a, b)))
    }

    fn records_for_sol(&self, vehicle: &str, sol: Sol) -> Result<Vec<TelemetryRecord>, SourceError> {
        Ok(self
            .by_vehicle
            .get(vehicle)
            .and_then(|sols| sols.get(&sol))
            .cloned()
            .unwrap_or_default())
    }
}
