//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `ORDERLY_DEBUG` | `debug` |
//! | `ORDERLY_LOG_LEVEL` | `log_level` |
//! | `ORDERLY_ORDERING_GAP` | `ordering_gap` |
//! | `ORDERLY_DATABASE_NAME` | `databases.default.name` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use orderly_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("orderly.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::OrderlyError;
use crate::settings::{DatabaseSettings, Settings};

/// Loads settings from a TOML string.
///
/// Fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, OrderlyError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| OrderlyError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, OrderlyError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, OrderlyError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, OrderlyError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| OrderlyError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, OrderlyError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, OrderlyError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a file, picking the format from its extension
/// (`.json` is JSON, anything else is TOML), then applies environment overrides.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, OrderlyError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json_file_with_env(path),
        _ => from_toml_file_with_env(path),
    }
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// - `ORDERLY_DEBUG` -> `debug` ("true"/"1"/"yes" => true, anything else => false)
/// - `ORDERLY_LOG_LEVEL` -> `log_level`
/// - `ORDERLY_ORDERING_GAP` -> `ordering_gap` (ignored unless a positive integer)
/// - `ORDERLY_DATABASE_NAME` -> name of the `default` database
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("ORDERLY_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("ORDERLY_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("ORDERLY_ORDERING_GAP") {
        match val.parse::<i64>() {
            Ok(gap) if gap > 1 => settings.ordering_gap = gap,
            _ => tracing::warn!("Ignoring invalid ORDERLY_ORDERING_GAP value {val:?}"),
        }
    }

    if let Ok(val) = std::env::var("ORDERLY_DATABASE_NAME") {
        settings
            .databases
            .entry("default".to_string())
            .or_insert_with(DatabaseSettings::default)
            .name = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, OrderlyError> {
    std::fs::read_to_string(path).map_err(|e| {
        OrderlyError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

/// Deep-merges `value` over the serialized defaults and deserializes the result.
fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, OrderlyError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        OrderlyError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    let settings: Settings = serde_json::from_value(merged).map_err(|e| {
        OrderlyError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), OrderlyError> {
    if settings.ordering_gap < 2 {
        return Err(OrderlyError::ConfigurationError(format!(
            "ordering_gap must be at least 2, got {}",
            settings.ordering_gap
        )));
    }
    for (label, model) in &settings.ordered_models {
        if model.db_table.is_empty() {
            return Err(OrderlyError::ConfigurationError(format!(
                "ordered model '{label}' has an empty db_table"
            )));
        }
        if let Some(gap) = model.gap.filter(|g| *g < 2) {
            return Err(OrderlyError::ConfigurationError(format!(
                "ordered model '{label}' has gap {gap}; it must be at least 2"
            )));
        }
    }
    Ok(())
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
