//! Common utilities for output formatters

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::{Result, SwitchError};

/// Escape a value for CSV output
/// Handles commas, quotes, and newlines according to RFC 4180
pub fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Serialize `value` as pretty JSON or YAML
pub fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yml::to_string(value)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|e| SwitchError::Config(format!("Failed to serialize to YAML: {}", e))),
        _ => Ok(serde_json::to_string_pretty(value)?),
    }
}
