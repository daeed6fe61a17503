//! PDF processing layer
//!
//! Text extraction via PDFium, encryption removal via qpdf, and fillable-form
//! field extraction with a pdftk fallback for XFA-only documents.

pub mod crypt;
pub mod fieldname;
pub mod form;
pub mod pdftk;
pub mod reader;

pub use crypt::{decrypt, is_encrypted};
pub use fieldname::{parse_field_name, ParsedFieldName};
pub use form::{
    build_structure, detect_form_type, extract_form_document, FormDocument, FormExtractOptions,
    FormField, FormType,
};
pub use reader::{extract_text, page_count, parse_page_range, PdfText};
