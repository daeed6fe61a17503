//! PDF encryption detection and removal
//!
//! Workflow PDFs (government forms in particular) frequently carry
//! empty-password encryption that blocks text and form extraction. This
//! module detects the `/Encrypt` marker cheaply and rewrites the document
//! without encryption via the qpdf crate (vendored FFI).

use crate::error::{Error, Result};
use qpdf::QPdf;

/// How far into the file the `/Encrypt` marker scan looks. The trailer
/// dictionary of real-world encrypted PDFs sits well within this window.
const ENCRYPT_SCAN_BYTES: usize = 10_000;

/// Check for the `/Encrypt` marker near the start of the file. A heuristic
/// that avoids running qpdf on unencrypted PDFs.
pub fn is_encrypted(data: &[u8]) -> bool {
    let window = &data[..data.len().min(ENCRYPT_SCAN_BYTES)];
    window.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
}

/// Map qpdf crate errors to our error types
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    match e.error_code() {
        qpdf::QPdfErrorCode::InvalidPassword => Error::IncorrectPassword,
        _ => Error::Qpdf {
            reason: e.to_string(),
        },
    }
}

/// Rewrite a PDF without its encryption layer.
///
/// With no password given, qpdf opens documents that use empty-password
/// encryption (the common case for distributed forms). A wrong or missing
/// password surfaces as [`Error::IncorrectPassword`].
pub fn decrypt(data: &[u8], password: Option<&str>) -> Result<Vec<u8>> {
    let doc = match password {
        Some(pwd) => QPdf::read_from_memory_encrypted(data, pwd),
        None => QPdf::read_from_memory(data),
    }
    .map_err(map_qpdf_error)?;

    let mut writer = doc.writer();
    writer.preserve_encryption(false);
    writer.write_to_memory().map_err(map_qpdf_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_marker_detected() {
        let mut data = b"%PDF-1.7\n".to_vec();
        data.extend_from_slice(b"trailer << /Encrypt 5 0 R /Root 1 0 R >>\n");
        assert!(is_encrypted(&data));
    }

    #[test]
    fn test_plain_pdf_not_flagged() {
        let data = b"%PDF-1.7\ntrailer << /Root 1 0 R >>\n%%EOF".to_vec();
        assert!(!is_encrypted(&data));
    }

    #[test]
    fn test_marker_outside_window_ignored() {
        let mut data = vec![b' '; ENCRYPT_SCAN_BYTES + 16];
        data.extend_from_slice(b"/Encrypt");
        assert!(!is_encrypted(&data));
    }

    #[test]
    fn test_empty_input() {
        assert!(!is_encrypted(b""));
    }
}
