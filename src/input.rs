//! Initial-input validation for workflow runs
//!
//! A workflow run starts from a JSON payload supplied on the command line.
//! This module parses it, checks the required fields, and writes a clean
//! copy for downstream steps to read.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;

/// Outcome of a successful validation: the clean payload plus a printable
/// one-line-per-field summary for the caller's log.
#[derive(Debug)]
pub struct ParsedInput {
    pub data: serde_json::Map<String, Value>,
    pub summary: String,
}

/// Render a field value for the summary line. Scalars print raw, composites
/// print as compact JSON, null prints as a placeholder.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "(not set)".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Parse and validate a JSON payload against a list of required fields.
///
/// The payload must be a JSON object. A required field is missing when it is
/// absent, `null`, or an empty string; every violation is reported in one
/// error.
pub fn validate(json_string: &str, required_fields: &[String]) -> Result<ParsedInput> {
    let value: Value =
        serde_json::from_str(json_string).map_err(|e| Error::InvalidInput {
            reason: format!("Invalid JSON: {e}"),
        })?;

    let data = match value {
        Value::Object(map) => map,
        _ => {
            return Err(Error::InvalidInput {
                reason: "Input must be a JSON object".to_string(),
            })
        }
    };

    let missing: Vec<String> = required_fields
        .iter()
        .filter(|f| match data.get(f.as_str()) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingFields { fields: missing });
    }

    let fields = data
        .iter()
        .map(|(k, v)| format!("  {k}: {}", render_value(v)))
        .collect::<Vec<_>>()
        .join("\n");
    let summary = format!("Parsed input ({} fields):\n{fields}", data.len());

    Ok(ParsedInput { data, summary })
}

/// Write the validated payload as pretty-printed JSON (with a trailing
/// newline), creating parent directories as needed.
pub fn write_clean<P: AsRef<Path>>(input: &ParsedInput, output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(&input.data)?;
    std::fs::write(output_path, format!("{json}\n"))?;
    Ok(())
}
