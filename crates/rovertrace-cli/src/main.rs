//! `rovertrace` – command-line front end to the telemetry analytics engine.
//!
//! Reads a JSON array of raw telemetry records, runs one query and prints a
//! JSON report to stdout:
//!
//! ```text
//! rovertrace panoramas --input telemetry.json --vehicle curiosity --sol-start 1000 --sol-end 1010
//! rovertrace panorama  --input telemetry.json curiosity-1000-0
//! rovertrace traverse  --input telemetry.json --vehicle curiosity --simplify 0.5 --geojson
//! rovertrace init-config
//! ```
//!
//! Defaults come from `~/.rovertrace/config.toml` and `ROVERTRACE_*`
//! variables; flags win over both.  Ctrl-C cancels the running query between
//! sol batches.

mod config;
mod telemetry;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rovertrace_analytics::{
    AnalyticsEngine, CancellationToken, InMemorySource, TraverseOptions,
};
use rovertrace_types::{RawTelemetry, Sol, SolRange, TelemetryRecord};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;

// ────────────────────────────────────────────────────────────────────────────
// Arguments
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "rovertrace", author, version, about = "Panorama and traverse analytics over rover telemetry")]
struct Cli {
    /// Config file to use instead of `~/.rovertrace/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detect panoramic sweeps over a sol window.
    Panoramas {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        window: WindowArgs,
        /// Minimum captures per panorama.
        #[arg(long)]
        min_photos: Option<usize>,
    },
    /// Look up one panorama by id (`vehicle-sol-index`).
    Panorama {
        #[command(flatten)]
        input: InputArgs,
        id: String,
        #[arg(long)]
        min_photos: Option<usize>,
    },
    /// Reconstruct the path driven over a sol window.
    Traverse {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        window: WindowArgs,
        /// Douglas–Peucker tolerance in metres.
        #[arg(long)]
        simplify: Option<f64>,
        /// Attach per-segment distance, bearing and elevation change.
        #[arg(long)]
        segments: bool,
        /// Emit a GeoJSON Feature instead of the point list.
        #[arg(long)]
        geojson: bool,
    },
    /// Write the default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// JSON array of raw telemetry records.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct WindowArgs {
    #[arg(long)]
    vehicle: String,
    #[arg(long)]
    sol_start: Option<Sol>,
    #[arg(long)]
    sol_end: Option<Sol>,
}

impl WindowArgs {
    /// `None` lets the engine pick its default window.  A single bound is
    /// open on the other side.
    fn requested(&self) -> Option<SolRange> {
        match (self.sol_start, self.sol_end) {
            (None, None) => None,
            (Some(start), None) => Some(SolRange::new(start, Sol::MAX)),
            (None, Some(end)) => Some(SolRange::new(0, end)),
            (Some(start), Some(end)) => Some(SolRange::new(start, end)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report envelope
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Report<T> {
    command: &'static str,
    generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vehicle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    window: Option<SolRange>,
    result: T,
}

impl<T: Serialize> Report<T> {
    fn new(command: &'static str, result: T) -> Self {
        Self {
            command,
            generated_at: Utc::now(),
            vehicle: None,
            window: None,
            result,
        }
    }

    fn scoped(mut self, vehicle: &str, window: Option<SolRange>) -> Self {
        self.vehicle = Some(vehicle.to_string());
        self.window = window;
        self
    }

    fn to_json(&self) -> Result<String, Box<dyn Error>> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Commands
// ────────────────────────────────────────────────────────────────────────────

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&data)?)
}

fn load_records(path: &Path) -> Result<Vec<TelemetryRecord>, Box<dyn Error>> {
    let raw: Vec<RawTelemetry> = load_json_file(path)?;
    let records: Vec<TelemetryRecord> = raw.into_iter().map(TelemetryRecord::from_raw).collect();
    let positioned = records.iter().filter(|r| r.position.is_some()).count();
    info!(path = %path.display(), records = records.len(), positioned, "telemetry loaded");
    Ok(records)
}

/// Run `command` and return the report as pretty JSON plus a one-line status.
fn run(
    command: &Command,
    cfg: &Config,
    cancel: &CancellationToken,
) -> Result<(String, String), Box<dyn Error>> {
    let mut panorama_cfg = cfg.panorama.clone();

    match command {
        Command::Panoramas { input, window, min_photos } => {
            if let Some(n) = min_photos {
                panorama_cfg.min_photos = *n;
            }
            let engine = engine_for(&input.input, cfg)?;
            let resolved = engine.resolve_window(&window.vehicle, window.requested())?;
            let found = engine.panoramas(&window.vehicle, window.requested(), &panorama_cfg, cancel)?;
            let status = format!("{} panorama(s) detected", found.len());
            let json = Report::new("panoramas", found)
                .scoped(&window.vehicle, resolved)
                .to_json()?;
            Ok((json, status))
        }
        Command::Panorama { input, id, min_photos } => {
            if let Some(n) = min_photos {
                panorama_cfg.min_photos = *n;
            }
            let engine = engine_for(&input.input, cfg)?;
            let found = engine.panorama(id, &panorama_cfg)?;
            let status = match &found {
                Some(seq) => format!("panorama {} has {} photo(s)", seq.id, seq.photo_count),
                None => format!("no panorama with id '{id}'"),
            };
            Ok((Report::new("panorama", found).to_json()?, status))
        }
        Command::Traverse { input, window, simplify, segments, geojson } => {
            let tolerance = simplify.unwrap_or(cfg.simplify_tolerance_m);
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(format!("--simplify must be a non-negative number, got {tolerance}").into());
            }
            let options = TraverseOptions {
                simplify_tolerance_m: tolerance,
                include_segments: *segments,
            };
            let engine = engine_for(&input.input, cfg)?;
            let resolved = engine.resolve_window(&window.vehicle, window.requested())?;
            let result = engine.traverse(&window.vehicle, window.requested(), &options, cancel)?;
            let status = format!(
                "{} point(s), {:.2} m driven",
                result.points.len(),
                result.summary.total_distance_m
            );
            let json = if *geojson {
                Report::new("traverse", result.to_geojson(&window.vehicle))
                    .scoped(&window.vehicle, resolved)
                    .to_json()?
            } else {
                Report::new("traverse", &result)
                    .scoped(&window.vehicle, resolved)
                    .to_json()?
            };
            Ok((json, status))
        }
        Command::InitConfig { .. } => Err("init-config does not run a query".into()),
    }
}

fn init_config(path: &Path, force: bool) -> Result<String, Box<dyn Error>> {
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    config::save_to(&Config::default(), path)?;
    Ok(format!("wrote default config to {}", path.display()))
}

fn engine_for(input: &Path, cfg: &Config) -> Result<AnalyticsEngine<InMemorySource>, Box<dyn Error>> {
    let source = InMemorySource::from_records(load_records(input)?);
    if source.record_count() == 0 {
        warn!(path = %input.display(), "input contains no telemetry");
    }
    Ok(AnalyticsEngine::with_policy(source, cfg.window))
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    if let Command::InitConfig { force } = &cli.command {
        let status = init_config(&config_path, *force)?;
        eprintln!("{} {status}", "✓".green().bold());
        return Ok(());
    }

    let cfg = config::load_or_default(&config_path)?;
    let _guard = telemetry::init_tracing("rovertrace", cfg.log_format);

    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("{}", "⚠  Ctrl-C received, cancelling query …".yellow().bold());
        handle.cancel();
    }) {
        warn!("Failed to install Ctrl-C handler: {e}");
    }

    let (json, status) = run(&cli.command, &cfg, &cancel)?;
    println!("{json}");
    eprintln!("{} {status}", "✓".green().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::NamedTempFile;

    /// One 4-image sweep on sol 10 and a short drive across sols 10–12.
    fn telemetry_file() -> NamedTempFile {
        let mut records = Vec::new();
        for i in 0..4 {
            records.push(json!({
                "id": i + 1,
                "vehicle": "curiosity",
                "sol": 10,
                "camera": "MAST_LEFT",
                "site": 5,
                "drive": 12,
                "xyz": "(1.0,2.0,-0.5)",
                "mast_az": format!("{}", 100 + 20 * i),
                "mast_el": "-4.0",
                "spacecraft_clock": format!("{}", 5000 + 60 * i),
                "local_time": "Sol-00010M11:02:00",
            }));
        }
        records.push(json!({
            "id": 10, "vehicle": "curiosity", "sol": 11, "camera": "NAV_LEFT",
            "xyz": "(4.0,6.0,-0.5)",
        }));
        records.push(json!({
            "id": 11, "vehicle": "curiosity", "sol": 12, "camera": "NAV_LEFT",
            "xyz": "(4.0,6.0,1.5)", "mast_az": "not-a-number",
        }));

        let file = NamedTempFile::new().unwrap();
        serde_json::to_writer(fs::File::create(file.path()).unwrap(), &records).unwrap();
        file
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rovertrace").chain(args.iter().copied())).unwrap()
    }

    fn run_json(args: &[&str]) -> Value {
        let cli = parse(args);
        let (json, _) = run(&cli.command, &Config::default(), &CancellationToken::new()).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn panoramas_report_lists_detected_sweeps() {
        let file = telemetry_file();
        let path = file.path().to_str().unwrap();
        let report = run_json(&["panoramas", "--input", path, "--vehicle", "curiosity"]);

        assert_eq!(report["command"], "panoramas");
        assert!(report["generated_at"].is_string());
        assert_eq!(report["vehicle"], "curiosity");
        assert_eq!(report["window"], json!({ "start": 10, "end": 12 }));
        let found = report["result"].as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["id"], "curiosity-10-0");
        assert_eq!(found[0]["photo_count"], 4);
        assert_eq!(found[0]["azimuth_coverage_deg"], 60.0);
    }

    #[test]
    fn min_photos_flag_overrides_config() {
        let file = telemetry_file();
        let path = file.path().to_str().unwrap();
        let report = run_json(&[
            "panoramas", "--input", path, "--vehicle", "curiosity", "--min-photos", "5",
        ]);
        assert!(report["result"].as_array().unwrap().is_empty());
    }

    #[test]
    fn panorama_lookup_hits_and_misses() {
        let file = telemetry_file();
        let path = file.path().to_str().unwrap();

        let hit = run_json(&["panorama", "--input", path, "curiosity-10-0"]);
        assert_eq!(hit["result"]["camera"], "MAST_LEFT");
        assert_eq!(hit["result"]["members"].as_array().unwrap().len(), 4);

        let miss = run_json(&["panorama", "--input", path, "curiosity-10-1"]);
        assert!(miss["result"].is_null());

        let bad = run_json(&["panorama", "--input", path, "garbage"]);
        assert!(bad["result"].is_null());
    }

    #[test]
    fn traverse_report_dedups_positions() {
        let file = telemetry_file();
        let path = file.path().to_str().unwrap();
        let report = run_json(&["traverse", "--input", path, "--vehicle", "curiosity", "--segments"]);

        let result = &report["result"];
        let points = result["points"].as_array().unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0]["first_sol"], 10);
        assert!(points[0].get("segment").is_none());
        assert_eq!(points[1]["segment"]["distance_m"], 5.0);
        assert_eq!(result["summary"]["total_distance_m"], 7.0);
        assert_eq!(result["summary"]["elevation_gain_m"], 2.0);
    }

    #[test]
    fn traverse_geojson_and_window() {
        let file = telemetry_file();
        let path = file.path().to_str().unwrap();
        let report = run_json(&[
            "traverse", "--input", path, "--vehicle", "curiosity", "--sol-start", "11", "--geojson",
        ]);

        assert_eq!(report["window"], json!({ "start": 11, "end": 12 }));
        assert_eq!(report["result"]["type"], "Feature");
        assert_eq!(report["result"]["geometry"]["type"], "LineString");
        assert_eq!(report["result"]["properties"]["vehicle"], "curiosity");
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let file = telemetry_file();
        let path = file.path().to_str().unwrap();
        let cli = parse(&[
            "traverse", "--input", path, "--vehicle", "curiosity", "--simplify=-1",
        ]);
        let err = run(&cli.command, &Config::default(), &CancellationToken::new()).unwrap_err();
        assert!(err.to_string().contains("--simplify"));
    }

    #[test]
    fn cancelled_query_reports_an_error() {
        let file = telemetry_file();
        let path = file.path().to_str().unwrap();
        let cli = parse(&["traverse", "--input", path, "--vehicle", "curiosity"]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run(&cli.command, &Config::default(), &cancel).unwrap_err();
        assert!(err.to_string().contains("cancel"));
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let cli = parse(&["traverse", "--input", "/nonexistent/telemetry.json", "--vehicle", "x"]);
        let err = run(&cli.command, &Config::default(), &CancellationToken::new()).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn init_config_refuses_to_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".rovertrace").join("config.toml");

        init_config(&path, false).unwrap();
        assert!(path.exists());
        let err = init_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        init_config(&path, true).unwrap();
    }

    #[test]
    fn one_sided_windows_are_open_ended() {
        let args = WindowArgs { vehicle: "v".into(), sol_start: Some(5), sol_end: None };
        assert_eq!(args.requested(), Some(SolRange::new(5, Sol::MAX)));
        let args = WindowArgs { vehicle: "v".into(), sol_start: None, sol_end: Some(9) };
        assert_eq!(args.requested(), Some(SolRange::new(0, 9)));
    }
}
