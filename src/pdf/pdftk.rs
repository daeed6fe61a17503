//! pdftk subprocess wrapper
//!
//! XFA-only PDFs hide their fields from AcroForm-level tooling; the one
//! reliable extractor is pdftk's `dump_data_fields`. The binary is invoked
//! on a temp copy of the document with a fixed timeout, and its line-based
//! report is parsed back into [`FormField`] records.

use crate::error::{Error, Result};
use crate::pdf::form::FormField;
use std::time::Duration;
use tokio::process::Command;

/// Install instructions shown when pdftk is missing.
pub const PDFTK_INSTALL_HINT: &str = "  Windows:  choco install pdftk-java\n  macOS:    brew install pdftk-java\n  Linux:    apt install pdftk";

const PDFTK_TIMEOUT: Duration = Duration::from_secs(30);

/// Check if pdftk is available on the system.
pub fn is_available() -> bool {
    which::which("pdftk").is_ok()
}

/// Map pdftk's field type vocabulary onto ours.
fn map_field_type(field_type: &str) -> &'static str {
    match field_type.to_lowercase().as_str() {
        "text" => "text",
        "button" => "checkbox",
        "choice" => "dropdown",
        _ => "unknown",
    }
}

/// Parse the `dump_data_fields` report: `---`-separated blocks of
/// `Key: value` lines. State options keep everything except the `Off`
/// pseudo-state pdftk reports for every checkbox.
pub fn parse_dump(report: &str) -> Vec<FormField> {
    let mut fields = Vec::new();

    for block in report.split("---").filter(|b| !b.trim().is_empty()) {
        let mut name = String::new();
        let mut field_type = String::new();
        let mut state_options: Vec<String> = Vec::new();

        for line in block.trim().lines() {
            if let Some(v) = line.strip_prefix("FieldName:") {
                name = v.trim().to_string();
            } else if let Some(v) = line.strip_prefix("FieldType:") {
                field_type = v.trim().to_string();
            } else if let Some(v) = line.strip_prefix("FieldStateOption:") {
                state_options.push(v.trim().to_string());
            }
        }

        if name.is_empty() {
            continue;
        }

        let options: Vec<String> = state_options.into_iter().filter(|o| o != "Off").collect();

        fields.push(FormField {
            name,
            field_type: map_field_type(&field_type).to_string(),
            options: if options.is_empty() {
                None
            } else {
                Some(options)
            },
            tooltip: None,
            max_length: None,
            rect: None,
        });
    }

    fields
}

/// Run `pdftk <pdf> dump_data_fields` on a temp copy and parse the result.
pub async fn dump_fields(data: &[u8]) -> Result<Vec<FormField>> {
    if !is_available() {
        return Err(Error::ToolUnavailable {
            tool: "pdftk",
            hint: PDFTK_INSTALL_HINT,
        });
    }

    let temp_dir = tempfile::Builder::new().prefix("pdf-extract-").tempdir()?;
    let input_pdf = temp_dir.path().join("input.pdf");
    tokio::fs::write(&input_pdf, data).await?;

    let output = tokio::time::timeout(
        PDFTK_TIMEOUT,
        Command::new("pdftk")
            .arg(&input_pdf)
            .arg("dump_data_fields")
            .output(),
    )
    .await
    .map_err(|_| Error::ToolFailed {
        tool: "pdftk",
        reason: format!("timed out after {}s", PDFTK_TIMEOUT.as_secs()),
    })?
    .map_err(|e| Error::ToolFailed {
        tool: "pdftk",
        reason: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: "pdftk",
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(parse_dump(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "---\nFieldType: Text\nFieldName: form1[0].Page1[0].Line1a_FamilyName[0]\nFieldNameAlt: Family Name\nFieldFlags: 0\nFieldJustification: Left\n---\nFieldType: Button\nFieldName: form1[0].Page1[0].Checkbox1[0]\nFieldStateOption: Off\nFieldStateOption: Yes\n---\nFieldType: Choice\nFieldName: form1[0].Page1[0].State[0]\nFieldStateOption: CA\nFieldStateOption: NY\n";

    #[test]
    fn test_parse_dump_blocks() {
        let fields = parse_dump(REPORT);
        assert_eq!(fields.len(), 3);

        assert_eq!(fields[0].name, "form1[0].Page1[0].Line1a_FamilyName[0]");
        assert_eq!(fields[0].field_type, "text");
        assert_eq!(fields[0].options, None);

        assert_eq!(fields[1].field_type, "checkbox");
        assert_eq!(fields[1].options, Some(vec!["Yes".to_string()]));

        assert_eq!(fields[2].field_type, "dropdown");
        assert_eq!(
            fields[2].options,
            Some(vec!["CA".to_string(), "NY".to_string()])
        );
    }

    #[test]
    fn test_parse_dump_skips_nameless_blocks() {
        let fields = parse_dump("---\nFieldType: Text\nFieldJustification: Left\n");
        assert!(fields.is_empty());
    }

    #[test]
    fn test_parse_dump_empty_report() {
        assert!(parse_dump("").is_empty());
    }

    #[test]
    fn test_unknown_type_mapping() {
        let fields = parse_dump("---\nFieldType: Signature\nFieldName: sig\n");
        assert_eq!(fields[0].field_type, "unknown");
    }

    #[test]
    fn test_checkbox_with_only_off_state_has_no_options() {
        let fields = parse_dump("---\nFieldType: Button\nFieldName: cb\nFieldStateOption: Off\n");
        assert_eq!(fields[0].options, None);
    }
}
