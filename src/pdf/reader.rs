//! PDF text extraction via PDFium
//!
//! Extracts page text in reading order. PDFium hands back characters in
//! content-stream order, which for many generated PDFs does not match the
//! visual layout, so characters are re-grouped into lines by Y coordinate
//! and sorted by X before the text is assembled.

use crate::error::{Error, Result};
use pdfium_render::prelude::*;

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
pub(crate) fn create_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Map PDFium errors to our error type
pub(crate) fn map_pdfium_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::PasswordRequired
        }
        _ => Error::Pdfium {
            reason: format!("{}", err),
        },
    }
}

/// Reject data that does not start with the PDF magic header.
pub fn ensure_pdf_header(data: &[u8]) -> Result<()> {
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// Extracted document text, one entry per page.
#[derive(Debug, Clone)]
pub struct PdfText {
    pages: Vec<String>,
}

impl PdfText {
    #[cfg(test)]
    fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Text of a single page (1-indexed).
    pub fn page(&self, page_num: u32) -> Result<&str> {
        if page_num < 1 || page_num > self.page_count() {
            return Err(Error::PageOutOfBounds {
                page: page_num,
                total: self.page_count(),
            });
        }
        Ok(&self.pages[(page_num - 1) as usize])
    }

    /// Join the selected pages (1-indexed) with blank lines.
    pub fn select_pages(&self, pages: &[u32]) -> String {
        pages
            .iter()
            .filter_map(|&p| self.page(p).ok())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Join all pages with blank lines.
    pub fn full_text(&self) -> String {
        self.pages.join("\n\n")
    }
}

/// Extract layout-ordered text from every page of a PDF.
pub fn extract_text(data: &[u8], password: Option<&str>) -> Result<PdfText> {
    ensure_pdf_header(data)?;

    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(data, password)
        .map_err(map_pdfium_error)?;

    let doc_pages = document.pages();
    let mut pages = Vec::with_capacity(doc_pages.len() as usize);

    for index in 0..doc_pages.len() {
        let page = doc_pages.get(index).map_err(|e| Error::Pdfium {
            reason: format!("Failed to get page {}: {}", index + 1, e),
        })?;
        pages.push(page_text_in_reading_order(&page));
    }

    Ok(PdfText { pages })
}

/// Page count without extracting text.
pub fn page_count(data: &[u8], password: Option<&str>) -> Result<u32> {
    ensure_pdf_header(data)?;

    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(data, password)
        .map_err(map_pdfium_error)?;

    Ok(document.pages().len() as u32)
}

// Characters within this many points vertically belong to the same line.
const Y_TOLERANCE: f32 = 5.0;
// Horizontal gaps wider than this become a space (word separation).
const SPACE_THRESHOLD: f32 = 10.0;

/// Rebuild a page's text in visual reading order: top-to-bottom lines,
/// left-to-right within a line, with spaces inserted at word-sized gaps.
fn page_text_in_reading_order(page: &PdfPage) -> String {
    let text_obj = match page.text() {
        Ok(t) => t,
        Err(_) => return String::new(),
    };

    let mut chars_with_pos: Vec<(char, f32, f32)> = Vec::new();
    for segment in text_obj.segments().iter() {
        if let Ok(chars) = segment.chars() {
            for char_result in chars.iter() {
                if let Some(c) = char_result.unicode_char() {
                    if let Ok(bounds) = char_result.loose_bounds() {
                        chars_with_pos.push((c, bounds.left().value, bounds.top().value));
                    }
                }
            }
        }
    }

    if chars_with_pos.is_empty() {
        return String::new();
    }

    // Y descending (top of page first), then X ascending.
    chars_with_pos.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Vec<(char, f32)>> = Vec::new();
    let mut current_line: Vec<(char, f32)> = Vec::new();
    let mut current_y: Option<f32> = None;

    for (c, x, y) in chars_with_pos {
        match current_y {
            Some(cur_y) if (cur_y - y).abs() <= Y_TOLERANCE => current_line.push((c, x)),
            _ => {
                if !current_line.is_empty() {
                    lines.push(std::mem::take(&mut current_line));
                }
                current_line.push((c, x));
                current_y = Some(y);
            }
        }
    }
    if !current_line.is_empty() {
        lines.push(current_line);
    }

    let mut result = String::new();
    for mut line in lines {
        line.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut prev_x: Option<f32> = None;
        for (c, x) in line {
            if let Some(px) = prev_x {
                if x - px > SPACE_THRESHOLD && c != ' ' {
                    result.push(' ');
                }
            }
            result.push(c);
            prev_x = Some(x);
        }
        result.push('\n');
    }

    result.trim_end().to_string()
}

/// Parse a page range string like `1-5` or `1,3,5` into sorted, deduplicated
/// 1-based page numbers, validated against the page count.
pub fn parse_page_range(range: &str, max_pages: u32) -> Result<Vec<u32>> {
    let mut pages = Vec::new();

    for part in range.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start.trim().parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;
            let end: u32 = end.trim().parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;

            if start < 1 || end > max_pages || start > end {
                return Err(Error::InvalidPageRange {
                    range: range.to_string(),
                });
            }

            pages.extend(start..=end);
        } else {
            let page: u32 = part.parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;

            if page < 1 || page > max_pages {
                return Err(Error::InvalidPageRange {
                    range: range.to_string(),
                });
            }

            pages.push(page);
        }
    }

    if pages.is_empty() {
        return Err(Error::InvalidPageRange {
            range: range.to_string(),
        });
    }

    pages.sort();
    pages.dedup();

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invalid_pdf_header_rejected() {
        let result = extract_text(b"not a pdf", None);
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_parse_page_range() {
        assert_eq!(parse_page_range("1-3", 10).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_page_range("1,3,5", 10).unwrap(), vec![1, 3, 5]);
        assert_eq!(
            parse_page_range("1-3,5,7-9", 10).unwrap(),
            vec![1, 2, 3, 5, 7, 8, 9]
        );
        assert_eq!(parse_page_range("1,1,2,2", 10).unwrap(), vec![1, 2]); // Dedup
        assert_eq!(parse_page_range(" 2 - 4 ", 10).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_parse_page_range_invalid() {
        assert!(parse_page_range("0-3", 10).is_err()); // 0 is invalid
        assert!(parse_page_range("1-15", 10).is_err()); // Out of bounds
        assert!(parse_page_range("5-3", 10).is_err()); // Start > End
        assert!(parse_page_range("abc", 10).is_err()); // Not a number
        assert!(parse_page_range("", 10).is_err()); // Nothing selected
    }

    #[test]
    fn test_select_pages_joins_with_blank_lines() {
        let text = PdfText::from_pages(vec![
            "one".to_string(),
            "two".to_string(),
            "three".to_string(),
        ]);
        assert_eq!(text.select_pages(&[1, 3]), "one\n\nthree");
        assert_eq!(text.full_text(), "one\n\ntwo\n\nthree");
    }

    #[test]
    fn test_page_access_bounds() {
        let text = PdfText::from_pages(vec!["only".to_string()]);
        assert!(text.page(0).is_err());
        assert!(text.page(2).is_err());
        assert_eq!(text.page(1).unwrap(), "only");
    }
}
