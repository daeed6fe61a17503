//! Error types shared by all stepkit commands

use thiserror::Error;

/// Result type alias for stepkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for stepkit operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input file not found
    #[error("{kind} file not found: {path}")]
    FileNotFound { kind: &'static str, path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected and no password was provided
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Incorrect password provided
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Invalid page range
    #[error("Invalid page range: {range}")]
    InvalidPageRange { range: String },

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: u32, total: u32 },

    /// Invalid dimension specification (resize/crop/viewport)
    #[error("Invalid {what}: \"{spec}\" (expected {expected})")]
    InvalidSpec {
        what: &'static str,
        spec: String,
        expected: &'static str,
    },

    /// Unsupported image format
    #[error("Unsupported image format \"{format}\" for: {path}\nSupported formats: {supported}")]
    UnsupportedFormat {
        format: String,
        path: String,
        supported: String,
    },

    /// A required external binary is not installed
    #[error("{tool} is not installed.\nInstall it:\n{hint}")]
    ToolUnavailable {
        tool: &'static str,
        hint: &'static str,
    },

    /// An external binary ran but failed or timed out
    #[error("{tool} invocation failed: {reason}")]
    ToolFailed { tool: &'static str, reason: String },

    /// Input JSON was rejected during validation
    #[error("{reason}")]
    InvalidInput { reason: String },

    /// Required fields absent from the input payload
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// The image generation API returned no usable image
    #[error("No image was returned by the model.")]
    NoImageReturned,

    /// The image generation API rejected the request
    #[error("Image API error ({status}): {message}")]
    ApiRejected { status: u16, message: String },

    /// Missing configuration (environment variable)
    #[error("Missing configuration: {name} environment variable is not set")]
    MissingConfig { name: &'static str },

    /// Too many reference images supplied
    #[error("Too many reference images: {count} (maximum is {max})")]
    TooManyReferences { count: usize, max: usize },

    /// Reference image exceeds the size limit
    #[error("Image exceeds {limit_mb} MB limit: {path} ({size_mb:.1} MB)")]
    ImageTooLarge {
        path: String,
        size_mb: f64,
        limit_mb: u64,
    },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// qpdf error
    #[error("qpdf error: {reason}")]
    Qpdf { reason: String },

    /// Image decode/encode error
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// File-not-found constructor used by every command that takes a path.
    pub fn not_found(kind: &'static str, path: impl std::fmt::Display) -> Self {
        Error::FileNotFound {
            kind,
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = Error::MissingFields {
            fields: vec!["query".to_string(), "content_type".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required fields: query, content_type"
        );
    }

    #[test]
    fn test_tool_unavailable_message_carries_hint() {
        let err = Error::ToolUnavailable {
            tool: "pdftk",
            hint: "  Linux:    apt install pdftk",
        };
        let msg = err.to_string();
        assert!(msg.starts_with("pdftk is not installed."));
        assert!(msg.contains("apt install pdftk"));
    }
}
