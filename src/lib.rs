//! stepkit Library
//!
//! This crate provides the workflow-step commands behind the `stepkit` CLI:
//! - `generate-image`: generate an image from a prompt via the Gemini API
//! - `render-html`: render an HTML file to a compressed PNG screenshot
//! - `resize-image`: resize, crop, or convert an image
//! - `read-pdf`: extract text from a PDF with automatic decryption
//! - `pdf-form`: extract fillable-form fields as structured JSON
//! - `json-extract`: evaluate an accessor expression against stdin JSON
//! - `parse-input`: validate a run's JSON payload

pub mod cli;
pub mod commands;
pub mod error;
pub mod genai;
pub mod imageops;
pub mod input;
pub mod jsonpath;
pub mod pdf;
pub mod render;

pub use cli::{Cli, Commands};
pub use error::{Error, Result};
