//! Analysis defaults, read from `~/.rovertrace/config.toml`.

use rovertrace_analytics::{PanoramaConfig, WindowPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log output format for the `tracing` subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Douglas–Peucker tolerance in metres applied when `--simplify` is not
    /// given.  Zero disables simplification.
    #[serde(default)]
    pub simplify_tolerance_m: f64,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub panorama: PanoramaConfig,

    #[serde(default)]
    pub window: WindowPolicy,
}

/// Return the path to `~/.rovertrace/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rovertrace").join("config.toml")
}

/// Load the config at `path`, or the defaults when no file exists.  Env
/// overrides are applied in both cases.
pub fn load_or_default(path: &Path) -> Result<Config, String> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.  Negative or non-finite thresholds are rejected.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    if let Some((field, value)) = cfg.panorama.invalid_threshold() {
        return Err(format!(
            "Invalid config at {}: panorama.{field} = {value} must be a non-negative number",
            path.display()
        ));
    }
    if !(cfg.simplify_tolerance_m.is_finite() && cfg.simplify_tolerance_m >= 0.0) {
        return Err(format!(
            "Invalid config at {}: simplify_tolerance_m = {} must be a non-negative number",
            path.display(),
            cfg.simplify_tolerance_m
        ));
    }
    Ok(Some(cfg))
}

/// Apply `ROVERTRACE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ROVERTRACE_MIN_PHOTOS` | `panorama.min_photos` |
/// | `ROVERTRACE_MIN_AZIMUTH_COVERAGE` | `panorama.min_azimuth_coverage_deg` |
/// | `ROVERTRACE_DEFAULT_WINDOW_SOLS` | `window.default_window_sols` |
/// | `ROVERTRACE_MAX_WINDOW_SOLS` | `window.max_window_sols` |
/// | `ROVERTRACE_LOG_FORMAT` | `log_format` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ROVERTRACE_MIN_PHOTOS")
        && let Ok(n) = v.parse::<usize>()
    {
        cfg.panorama.min_photos = n;
    }
    if let Ok(v) = std::env::var("ROVERTRACE_MIN_AZIMUTH_COVERAGE")
        && let Ok(deg) = v.parse::<f64>()
        && deg.is_finite()
        && deg >= 0.0
    {
        cfg.panorama.min_azimuth_coverage_deg = deg;
    }
    if let Ok(v) = std::env::var("ROVERTRACE_DEFAULT_WINDOW_SOLS")
        && let Ok(n) = v.parse::<u32>()
    {
        cfg.window.default_window_sols = n;
    }
    if let Ok(v) = std::env::var("ROVERTRACE_MAX_WINDOW_SOLS")
        && let Ok(n) = v.parse::<u32>()
    {
        cfg.window.max_window_sols = n;
    }
    if let Ok(v) = std::env::var("ROVERTRACE_LOG_FORMAT")
        && let Ok(format) = v.parse::<LogFormat>()
    {
        cfg.log_format = format;
    }
}

/// Save the config, creating the parent directory if necessary.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
