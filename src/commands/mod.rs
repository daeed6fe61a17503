//! Subcommand handlers
//!
//! Each handler is deliberately thin: unpack CLI arguments, call into the
//! library, print the result (a path or the payload itself) on stdout.

pub mod generate_image;
pub mod json_extract;
pub mod parse_input;
pub mod pdf_form;
pub mod read_pdf;
pub mod render_html;
pub mod resize_image;
