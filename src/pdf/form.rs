//! Fillable-form field extraction
//!
//! Three-branch engine selection over a detected form type:
//!
//! 1. XFA-only documents hide their fields from AcroForm tooling, so they go
//!    through the external `pdftk` binary.
//! 2. AcroForm documents (including XFA hybrids) are read with PDFium;
//!    tooltips (`/TU`) and length limits (`/MaxLen`), which PDFium does not
//!    surface, are filled in from the field dictionaries via lopdf. An empty
//!    PDFium result falls back to pdftk.
//! 3. Documents with neither produce a warning and an empty field list.
//!
//! Extraction is best-effort throughout: engine failures become warnings in
//! the output document rather than process errors.

use crate::error::{Error, Result};
use crate::pdf::fieldname::parse_field_name;
use crate::pdf::reader::{create_pdfium, ensure_pdf_header, map_pdfium_error};
use crate::pdf::{crypt, pdftk, reader};
use pdfium_render::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Widget bounding rectangle in PDF points (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One extracted form field.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<FieldRect>,
}

/// Which form technologies a document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormType {
    pub has_xfa: bool,
    pub has_acroform: bool,
}

impl FormType {
    /// XFA with no AcroForm fields: only pdftk can extract anything.
    pub fn xfa_only(&self) -> bool {
        self.has_xfa && !self.has_acroform
    }
}

/// Document-level metadata echoed into the JSON output.
#[derive(Debug, Serialize)]
pub struct FormMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    pub encrypted: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub decrypted: bool,
    pub engine: &'static str,
    #[serde(rename = "formType")]
    pub form_type: FormTypeJson,
}

/// Serialized form-type flags (field names match the step's consumers).
#[derive(Debug, Serialize)]
pub struct FormTypeJson {
    #[serde(rename = "hasXFA")]
    pub has_xfa: bool,
    #[serde(rename = "hasAcroForm")]
    pub has_acroform: bool,
}

/// The complete `pdf-form` output document.
#[derive(Debug, Serialize)]
pub struct FormDocument {
    #[serde(rename = "type")]
    pub doc_type: &'static str,
    pub metadata: FormMetadata,
    pub fields: Vec<FormField>,
    #[serde(rename = "fieldCount")]
    pub field_count: usize,
    pub structure: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Options for form extraction.
#[derive(Debug, Clone, Default)]
pub struct FormExtractOptions {
    pub skip_decryption: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Scan the raw bytes for XFA markers (packet key, XDP envelope, namespace).
fn has_xfa_markers(data: &[u8]) -> bool {
    contains_bytes(data, b"/XFA")
        || contains_bytes(data, b"<xdp:xdp")
        || contains_bytes(data, b"xmlns:xfa")
}

/// Detect which form technologies the document carries. A document counts as
/// AcroForm only when PDFium actually reports widget fields; load failures
/// count as "no AcroForm", mirroring the engine-selection fallback.
pub fn detect_form_type(data: &[u8]) -> FormType {
    let has_acroform = widget_fields(data)
        .map(|fields| !fields.is_empty())
        .unwrap_or(false);

    FormType {
        has_xfa: has_xfa_markers(data),
        has_acroform,
    }
}

/// Walk every page's widget annotations with PDFium and map them to our
/// type vocabulary. Choice widgets both map to `dropdown`; buttons and
/// signatures stay `unknown` because the workflow never fills them. Radio
/// groups and other multi-widget fields are deduplicated by name, first
/// widget wins.
fn widget_fields(data: &[u8]) -> Result<Vec<FormField>> {
    ensure_pdf_header(data)?;

    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(map_pdfium_error)?;

    let mut fields: Vec<FormField> = Vec::new();
    let pages = document.pages();

    for page_index in 0..pages.len() {
        let page = pages.get(page_index).map_err(|e| Error::Pdfium {
            reason: format!("Failed to get page {}: {}", page_index + 1, e),
        })?;

        for annotation in page.annotations().iter() {
            if let Some(field) = annotation.as_form_field() {
                let Some(name) = field.name() else {
                    continue;
                };
                if fields.iter().any(|f| f.name == name) {
                    continue;
                }

                let mut field_type = "unknown";
                let mut options: Option<Vec<String>> = None;

                if field.as_text_field().is_some() {
                    field_type = "text";
                } else if field.as_checkbox_field().is_some() {
                    field_type = "checkbox";
                } else if field.as_radio_button_field().is_some() {
                    field_type = "radio";
                } else if let Some(combo) = field.as_combo_box_field() {
                    field_type = "dropdown";
                    let mut labels = Vec::new();
                    for i in 0..combo.options().len() {
                        if let Ok(opt) = combo.options().get(i) {
                            if let Some(label) = opt.label() {
                                labels.push(label.clone());
                            }
                        }
                    }
                    if !labels.is_empty() {
                        options = Some(labels);
                    }
                } else if let Some(list) = field.as_list_box_field() {
                    field_type = "dropdown";
                    let mut labels = Vec::new();
                    for i in 0..list.options().len() {
                        if let Ok(opt) = list.options().get(i) {
                            if let Some(label) = opt.label() {
                                labels.push(label.clone());
                            }
                        }
                    }
                    if !labels.is_empty() {
                        options = Some(labels);
                    }
                }

                let rect = annotation.bounds().ok().map(|bounds| FieldRect {
                    x: bounds.left().value,
                    y: bounds.bottom().value,
                    width: bounds.right().value - bounds.left().value,
                    height: bounds.top().value - bounds.bottom().value,
                });

                fields.push(FormField {
                    name,
                    field_type: field_type.to_string(),
                    options,
                    tooltip: None,
                    max_length: None,
                    rect,
                });
            }
        }
    }

    Ok(fields)
}

/// Decode a PDF text string: UTF-16BE with BOM, else latin-ish bytes.
fn decode_pdf_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn dict_partial_name(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Option<String> {
    match dict.get(b"T").map(|o| resolve(doc, o)) {
        Ok(lopdf::Object::String(bytes, _)) => Some(decode_pdf_text(bytes)),
        _ => None,
    }
}

/// Rebuild a field's fully-qualified name by walking the `/Parent` chain and
/// joining the partial `/T` names with dots. Depth is capped to guard
/// against cyclic dictionaries in malformed files.
fn qualified_name(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Option<String> {
    let mut segments = vec![dict_partial_name(doc, dict)?];

    let mut current = dict.clone();
    for _ in 0..32 {
        let parent_id = match current.get(b"Parent") {
            Ok(lopdf::Object::Reference(id)) => *id,
            _ => break,
        };
        let parent = match doc.get_object(parent_id) {
            Ok(lopdf::Object::Dictionary(d)) => d.clone(),
            _ => break,
        };
        if let Some(segment) = dict_partial_name(doc, &parent) {
            segments.push(segment);
        }
        current = parent;
    }

    segments.reverse();
    Some(segments.join("."))
}

/// Collect `/TU` (tooltip) and `/MaxLen` per fully-qualified field name from
/// the raw field dictionaries. PDFium's widget API exposes neither.
fn field_annotations(
    data: &[u8],
) -> std::result::Result<HashMap<String, (Option<String>, Option<i64>)>, lopdf::Error> {
    let doc = lopdf::Document::load_mem(data)?;
    let mut map = HashMap::new();

    for obj in doc.objects.values() {
        let dict = match obj {
            lopdf::Object::Dictionary(d) => d,
            _ => continue,
        };
        if dict.get(b"T").is_err() {
            continue;
        }

        let tooltip = match dict.get(b"TU").map(|o| resolve(&doc, o)) {
            Ok(lopdf::Object::String(bytes, _)) => Some(decode_pdf_text(bytes)),
            _ => None,
        };
        let max_length = match dict.get(b"MaxLen").map(|o| resolve(&doc, o)) {
            Ok(lopdf::Object::Integer(n)) => Some(*n),
            _ => None,
        };

        if tooltip.is_none() && max_length.is_none() {
            continue;
        }
        if let Some(name) = qualified_name(&doc, dict) {
            map.insert(name, (tooltip, max_length));
        }
    }

    Ok(map)
}

/// PDFium extraction enriched with lopdf tooltip/max-length data.
fn acroform_fields(data: &[u8]) -> Result<Vec<FormField>> {
    let mut fields = widget_fields(data)?;

    match field_annotations(data) {
        Ok(meta) => {
            for field in &mut fields {
                if let Some((tooltip, max_length)) = meta.get(&field.name) {
                    field.tooltip = tooltip.clone();
                    field.max_length = *max_length;
                }
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "field dictionary walk failed, skipping tooltips");
        }
    }

    Ok(fields)
}

/// Group a flat field list into `pages → parts → { fields: [...] }` using
/// the decomposed field names; fields without page/part components land in
/// `_unknown` buckets. Key order follows first appearance.
pub fn build_structure(fields: &[FormField]) -> Result<Value> {
    let mut pages: Vec<(String, Vec<(String, Vec<Value>)>)> = Vec::new();

    for field in fields {
        let parsed = parse_field_name(&field.name);
        let page_name = parsed.page.clone().unwrap_or_else(|| "_unknown".to_string());
        let part_name = parsed.part.clone().unwrap_or_else(|| "_unknown".to_string());

        let mut entry = serde_json::to_value(field)?;
        if let Value::Object(map) = &mut entry {
            if let Some(item) = &parsed.item {
                map.insert("item".to_string(), Value::String(item.clone()));
            }
            if let Some(description) = &parsed.description {
                map.insert("description".to_string(), Value::String(description.clone()));
            }
        }

        let page_idx = match pages.iter().position(|(name, _)| *name == page_name) {
            Some(i) => i,
            None => {
                pages.push((page_name, Vec::new()));
                pages.len() - 1
            }
        };
        let page_bucket = &mut pages[page_idx].1;

        let part_idx = match page_bucket.iter().position(|(name, _)| *name == part_name) {
            Some(i) => i,
            None => {
                page_bucket.push((part_name, Vec::new()));
                page_bucket.len() - 1
            }
        };
        page_bucket[part_idx].1.push(entry);
    }

    let mut pages_map = Map::new();
    for (page_name, parts) in pages {
        let mut parts_map = Map::new();
        for (part_name, entries) in parts {
            let mut part_obj = Map::new();
            part_obj.insert("fields".to_string(), Value::Array(entries));
            parts_map.insert(part_name, Value::Object(part_obj));
        }
        pages_map.insert(page_name, Value::Object(parts_map));
    }

    let mut root = Map::new();
    root.insert("pages".to_string(), Value::Object(pages_map));
    Ok(Value::Object(root))
}

/// Extract form fields from a fillable PDF into a structured document.
/// For text extraction, use `read-pdf` instead.
pub async fn extract_form_document<P: AsRef<Path>>(
    pdf_path: P,
    options: &FormExtractOptions,
) -> Result<FormDocument> {
    let pdf_path = pdf_path.as_ref();
    if !pdf_path.exists() {
        return Err(Error::not_found("PDF", pdf_path.display()));
    }

    let mut data = std::fs::read(pdf_path)?;
    let encrypted = crypt::is_encrypted(&data);
    let mut decrypted = false;

    if encrypted && !options.skip_decryption {
        data = crypt::decrypt(&data, None)?;
        decrypted = true;
        tracing::info!("decrypted {} for extraction", pdf_path.display());
    }

    let form_type = detect_form_type(&data);
    let total_pages = reader::page_count(&data, None).ok();

    let mut warnings = Vec::new();
    let mut engine = "none";
    let mut fields: Vec<FormField> = Vec::new();

    if form_type.xfa_only() {
        warnings.push("XFA-only PDF, using pdftk for extraction".to_string());
        if !pdftk::is_available() {
            warnings.push(format!(
                "pdftk is not installed. Install it for XFA field extraction:\n{}",
                pdftk::PDFTK_INSTALL_HINT
            ));
        } else {
            match pdftk::dump_fields(&data).await {
                Ok(extracted) => fields = extracted,
                Err(e) => warnings.push(format!("pdftk extraction error: {e}")),
            }
            if !fields.is_empty() {
                engine = "pdftk";
            }
        }
    } else if form_type.has_acroform {
        match acroform_fields(&data) {
            Ok(extracted) => fields = extracted,
            Err(e) => warnings.push(format!("AcroForm extraction warning: {e}")),
        }
        if !fields.is_empty() {
            engine = "pdfium";
        } else {
            warnings.push("AcroForm engine returned 0 fields, attempting pdftk fallback".to_string());
            if pdftk::is_available() {
                match pdftk::dump_fields(&data).await {
                    Ok(extracted) => fields = extracted,
                    Err(e) => warnings.push(format!("pdftk extraction error: {e}")),
                }
                if !fields.is_empty() {
                    engine = "pdftk";
                }
            } else {
                warnings.push("pdftk not available for fallback".to_string());
            }
        }
    } else {
        warnings.push(
            "No form fields detected. This PDF may not be fillable. Use read-pdf for text extraction."
                .to_string(),
        );
    }

    tracing::info!(
        engine,
        field_count = fields.len(),
        "form extraction finished"
    );

    let structure = build_structure(&fields)?;
    let field_count = fields.len();

    Ok(FormDocument {
        doc_type: "form",
        metadata: FormMetadata {
            pages: total_pages,
            encrypted,
            decrypted,
            engine,
            form_type: FormTypeJson {
                has_xfa: form_type.has_xfa,
                has_acroform: form_type.has_acroform,
            },
        },
        fields,
        field_count,
        structure,
        warnings,
    })
}
