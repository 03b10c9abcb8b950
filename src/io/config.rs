//! Persisted analysis configuration.
//!
//! The file is a flat JSON object with upper-case keys (`SMOOTH_WINDOW`,
//! `GAUGE_LENGTH_MM`, ...). Loading is lenient: each key is coerced on its
//! own, numbers and numeric strings are accepted, and a bad value keeps the
//! default. Unknown keys are ignored.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::AnalysisConfig;
use crate::error::AppError;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "ECC_CONFIG";

/// File name used in the home directory.
pub const CONFIG_FILE_NAME: &str = ".ecc_analyzer_config.json";

/// Resolve the config path: explicit flag, then `ECC_CONFIG`, then the home
/// directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env::var(CONFIG_ENV_VAR).ok().filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .ok_or_else(|| AppError::new(2, format!("Cannot locate home directory; set {CONFIG_ENV_VAR}.")))?;
    Ok(PathBuf::from(home).join(CONFIG_FILE_NAME))
}

/// Load the configuration at `path`; a missing file yields defaults.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(AnalysisConfig::default());
    }
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| AppError::new(2, format!("Invalid config JSON '{}': {e}", path.display())))?;
    Ok(config_from_value(&value))
}

/// Build a configuration from a parsed JSON document, key by key.
pub fn config_from_value(value: &Value) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    let Some(map) = value.as_object() else {
        warn!("config root is not a JSON object; using defaults");
        return config;
    };

    for (key, raw) in map {
        match key.as_str() {
            "SMOOTH_WINDOW" => set_usize(key, raw, &mut config.smooth_window),
            "ELASTIC_LOWER_RATIO" => set_f64(key, raw, &mut config.elastic_lower_ratio),
            "ELASTIC_UPPER_RATIO" => set_f64(key, raw, &mut config.elastic_upper_ratio),
            "ULTIMATE_STRAIN_RATIO" => set_f64(key, raw, &mut config.ultimate_strain_ratio),
            "GAUGE_LENGTH_MM" => set_f64(key, raw, &mut config.gauge_length_mm),
            "CRACK_TOLERANCE_BASE" => set_f64(key, raw, &mut config.crack_tolerance_base),
            _ => debug!(key = %key, "ignoring unknown config key"),
        }
    }
    config
}

fn coerce_f64(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

fn set_f64(key: &str, raw: &Value, slot: &mut f64) {
    match coerce_f64(raw) {
        Some(v) => *slot = v,
        None => warn!(key, value = %raw, "config type mismatch; keeping default"),
    }
}

fn set_usize(key: &str, raw: &Value, slot: &mut usize) {
    let parsed = match raw {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed.and_then(|v| usize::try_from(v).ok()) {
        Some(v) => *slot = v,
        None => warn!(key, value = %raw, "config type mismatch; keeping default"),
    }
}

/// Save the configuration as pretty JSON.
pub fn save_config(path: &Path, config: &AnalysisConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let text = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::new(4, format!("Failed to serialize config: {e}")))?;
    fs::write(path, text).map_err(|e| AppError::new(2, format!("Failed to write config '{}': {e}", path.display())))
}

/// Overwrite the file at `path` with defaults and return them.
pub fn reset_config(path: &Path) -> Result<AnalysisConfig, AppError> {
    let config = AnalysisConfig::default();
    save_config(path, &config)?;
    Ok(config)
}
