//! Command-line interface definitions.

use crate::imageops::{FitMode, OutputFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Single-purpose command-line steps for content automation workflows
#[derive(Parser, Debug)]
#[command(name = "stepkit", version, about, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an image from a text prompt via the Gemini API
    GenerateImage(GenerateImageArgs),

    /// Render an HTML file to a compressed PNG screenshot
    RenderHtml(RenderHtmlArgs),

    /// Resize, crop, or convert an image
    ResizeImage(ResizeImageArgs),

    /// Extract text from a PDF, decrypting it first when needed
    ReadPdf(ReadPdfArgs),

    /// Extract form fields from a fillable PDF as structured JSON
    PdfForm(PdfFormArgs),

    /// Evaluate an accessor expression against JSON read from stdin
    JsonExtract(JsonExtractArgs),

    /// Validate a JSON payload and write a clean copy for later steps
    ParseInput(ParseInputArgs),
}

#[derive(Args, Debug)]
pub struct GenerateImageArgs {
    /// Text prompt describing the image
    pub prompt: String,

    /// Reference image file or folder (repeatable)
    #[arg(long = "ref", value_name = "PATH")]
    pub refs: Vec<PathBuf>,

    /// Directory for the generated image (default: output/images)
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Output file name without extension (default: random UUID)
    #[arg(long)]
    pub filename: Option<String>,

    /// Model override
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Debug)]
pub struct RenderHtmlArgs {
    /// HTML file to render
    pub html_file: PathBuf,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 630)]
    pub height: u32,

    /// Capture the full page height instead of the viewport
    #[arg(long)]
    pub full_page: bool,

    /// Output PNG path (default: output/images/<uuid>.png)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResizeImageArgs {
    /// Image file to transform
    pub image: PathBuf,

    /// Resize to WxH, e.g. 400x300
    #[arg(long, value_name = "WxH")]
    pub resize: Option<String>,

    /// Crop to WxH (center) or WxH+X+Y (region)
    #[arg(long, value_name = "SPEC")]
    pub crop: Option<String>,

    /// How the resize maps onto the target box
    #[arg(long, value_enum, default_value = "inside")]
    pub fit: FitMode,

    /// Center-crop gravity (only `center` is honored)
    #[arg(long)]
    pub gravity: Option<String>,

    /// Output format (default: input format, else png)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// JPEG quality 1-100 (default 85)
    #[arg(long)]
    pub quality: Option<u8>,

    /// Output path (default: derived under output/images)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReadPdfArgs {
    /// PDF file to read
    pub pdf_file: PathBuf,

    /// Save extracted text to a file instead of stdout
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Just decrypt the PDF, save it, and print the path
    #[arg(long)]
    pub decrypt_only: bool,

    /// Page range, e.g. "1-5" or "1,3,5"
    #[arg(long, value_name = "RANGE")]
    pub pages: Option<String>,

    /// Attempt to read without decrypting
    #[arg(long)]
    pub skip_decryption: bool,
}

#[derive(Args, Debug)]
pub struct PdfFormArgs {
    /// Fillable PDF to extract
    pub pdf_file: PathBuf,

    /// Save JSON to a file instead of stdout
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON (default)
    #[arg(long)]
    pub pretty: bool,

    /// Compact JSON output
    #[arg(long, conflicts_with = "pretty")]
    pub no_pretty: bool,

    /// Attempt to read without decrypting
    #[arg(long)]
    pub skip_decryption: bool,
}

#[derive(Args, Debug)]
pub struct JsonExtractArgs {
    /// Accessor expression rooted at `o`, e.g. `o.items[0].name`
    pub expression: String,
}

#[derive(Args, Debug)]
pub struct ParseInputArgs {
    /// JSON payload to validate
    pub json: String,

    /// Where to write the clean copy
    pub output_path: PathBuf,

    /// Fields that must be present and non-empty
    #[arg(value_name = "REQUIRED_FIELD")]
    pub required_fields: Vec<String>,
}
