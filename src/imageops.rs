//! Image resize/crop/convert operations
//!
//! Wraps the `image` crate for the `resize-image` step: region or center
//! crops, aspect-aware resizing with several fit modes, and re-encoding to
//! PNG/JPEG/WebP with sensible compression defaults.

use crate::error::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use regex::Regex;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Default directory for derived images.
pub const DEFAULT_OUTPUT_DIR: &str = "output/images";

const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Target dimensions parsed from a `WxH` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Crop region parsed from `WxH` (center crop) or `WxH+X+Y` (exact region).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropSpec {
    pub width: u32,
    pub height: u32,
    pub offset: Option<(u32, u32)>,
}

/// How a resize maps the source onto the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FitMode {
    /// Cover the box, cropping overflow
    Cover,
    /// Fit within the box, preserving aspect ratio
    Contain,
    /// Stretch to the exact box
    Fill,
    /// Fit within the box, never enlarging
    #[default]
    Inside,
    /// Cover the box without cropping (result may exceed one dimension)
    Outside,
}

/// Output encoding for the transformed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Jpg,
    Webp,
}

impl OutputFormat {
    /// Canonical name (jpg folds into jpeg).
    fn canonical(self) -> OutputFormat {
        match self {
            OutputFormat::Jpg => OutputFormat::Jpeg,
            other => other,
        }
    }

    /// File extension for the output path.
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg | OutputFormat::Jpg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    fn from_extension(ext: &str) -> Option<OutputFormat> {
        match ext {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "webp" => Some(OutputFormat::Webp),
            _ => None,
        }
    }
}

/// Options for a single resize/crop/convert invocation.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    pub resize: Option<Dimensions>,
    pub crop: Option<CropSpec>,
    pub fit: FitMode,
    pub format: Option<OutputFormat>,
    pub quality: Option<u8>,
    pub output: Option<PathBuf>,
}

fn dimensions_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)x(\d+)$").unwrap())
}

fn crop_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)x(\d+)(?:\+(\d+)\+(\d+))?$").unwrap())
}

/// Parse a dimension string like `400x300`.
pub fn parse_dimensions(spec: &str) -> Result<Dimensions> {
    let caps = dimensions_re()
        .captures(spec)
        .ok_or_else(|| Error::InvalidSpec {
            what: "dimensions",
            spec: spec.to_string(),
            expected: "WxH, e.g. 400x300",
        })?;
    Ok(Dimensions {
        width: caps[1].parse().map_err(|_| Error::InvalidSpec {
            what: "dimensions",
            spec: spec.to_string(),
            expected: "WxH, e.g. 400x300",
        })?,
        height: caps[2].parse().map_err(|_| Error::InvalidSpec {
            what: "dimensions",
            spec: spec.to_string(),
            expected: "WxH, e.g. 400x300",
        })?,
    })
}

/// Parse a crop spec like `400x300` or `400x300+10+20`.
pub fn parse_crop_spec(spec: &str) -> Result<CropSpec> {
    let invalid = || Error::InvalidSpec {
        what: "crop spec",
        spec: spec.to_string(),
        expected: "WxH or WxH+X+Y, e.g. 400x300 or 400x300+10+20",
    };
    let caps = crop_re().captures(spec).ok_or_else(invalid)?;
    let width = caps[1].parse().map_err(|_| invalid())?;
    let height = caps[2].parse().map_err(|_| invalid())?;
    let offset = match (caps.get(3), caps.get(4)) {
        (Some(x), Some(y)) => Some((
            x.as_str().parse().map_err(|_| invalid())?,
            y.as_str().parse().map_err(|_| invalid())?,
        )),
        _ => None,
    };
    Ok(CropSpec {
        width,
        height,
        offset,
    })
}

/// Apply the crop stage: exact region when an offset is given, otherwise a
/// cover-resize center crop.
fn apply_crop(img: DynamicImage, spec: &CropSpec) -> Result<DynamicImage> {
    match spec.offset {
        Some((x, y)) => {
            let (w, h) = (img.width(), img.height());
            if x.saturating_add(spec.width) > w || y.saturating_add(spec.height) > h {
                return Err(Error::InvalidSpec {
                    what: "crop spec",
                    spec: format!("{}x{}+{}+{}", spec.width, spec.height, x, y),
                    expected: "a region inside the image bounds",
                });
            }
            Ok(img.crop_imm(x, y, spec.width, spec.height))
        }
        None => Ok(img.resize_to_fill(spec.width, spec.height, FilterType::Lanczos3)),
    }
}

/// Apply the resize stage according to the fit mode. The default `inside`
/// mode never enlarges, matching the step's contract for thumbnails.
fn apply_resize(img: DynamicImage, dims: Dimensions, fit: FitMode) -> DynamicImage {
    let (w, h) = (dims.width, dims.height);
    match fit {
        FitMode::Inside => {
            if img.width() <= w && img.height() <= h {
                img
            } else {
                img.resize(w, h, FilterType::Lanczos3)
            }
        }
        FitMode::Contain => img.resize(w, h, FilterType::Lanczos3),
        FitMode::Cover => img.resize_to_fill(w, h, FilterType::Lanczos3),
        FitMode::Fill => img.resize_exact(w, h, FilterType::Lanczos3),
        FitMode::Outside => {
            let scale = f64::max(
                w as f64 / img.width() as f64,
                h as f64 / img.height() as f64,
            );
            let out_w = (img.width() as f64 * scale).round().max(1.0) as u32;
            let out_h = (img.height() as f64 * scale).round().max(1.0) as u32;
            img.resize_exact(out_w, out_h, FilterType::Lanczos3)
        }
    }
}

/// Encode the image to the writer in the requested format.
///
/// PNG uses best compression. JPEG honors the quality option (flattening any
/// alpha channel first). WebP encoding is lossless, so quality is ignored.
fn encode_to<W: std::io::Write>(
    img: &DynamicImage,
    writer: W,
    format: OutputFormat,
    quality: Option<u8>,
) -> Result<()> {
    match format.canonical() {
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                writer,
                CompressionType::Best,
                image::codecs::png::FilterType::Adaptive,
            );
            img.write_with_encoder(encoder)?;
        }
        OutputFormat::Jpeg | OutputFormat::Jpg => {
            let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
            let mut encoder = JpegEncoder::new_with_quality(writer, quality);
            let rgb = img.to_rgb8();
            encoder.encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )?;
        }
        OutputFormat::Webp => {
            let encoder = WebPEncoder::new_lossless(writer);
            let rgba = img.to_rgba8();
            encoder.encode(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                image::ExtendedColorType::Rgba8,
            )?;
        }
    }
    Ok(())
}

/// Decide the output format: explicit flag, else input extension, else PNG.
fn resolve_format(input: &Path, requested: Option<OutputFormat>) -> OutputFormat {
    requested
        .map(OutputFormat::canonical)
        .or_else(|| {
            input
                .extension()
                .and_then(|e| e.to_str())
                .and_then(|e| OutputFormat::from_extension(&e.to_lowercase()))
        })
        .unwrap_or(OutputFormat::Png)
}

/// Derive the default output path: `<stem><-resize><-cropSPEC>.<ext>` under
/// the shared output directory, with `+` flattened to `_` in the crop suffix.
fn derive_output_path(input: &Path, options: &TransformOptions, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    let mut suffix = String::new();
    if let Some(dims) = &options.resize {
        suffix.push_str(&format!("-{}x{}", dims.width, dims.height));
    }
    if let Some(crop) = &options.crop {
        suffix.push_str(&format!("-crop{}x{}", crop.width, crop.height));
        if let Some((x, y)) = crop.offset {
            suffix.push_str(&format!("_{x}_{y}"));
        }
    }

    PathBuf::from(DEFAULT_OUTPUT_DIR).join(format!("{stem}{suffix}.{}", format.extension()))
}

/// Re-encode an image file as a best-compression PNG. Screenshot tools
/// write fast, large PNGs; this trades CPU for the smaller artifact the
/// workflow stores.
pub fn recompress_png(src: &Path, dest: &Path) -> Result<()> {
    let img = image::open(src)?;
    let file = std::fs::File::create(dest)?;
    encode_to(&img, BufWriter::new(file), OutputFormat::Png, None)
}

/// Resize, crop, or convert an image file. Returns the absolute output path.
pub fn transform<P: AsRef<Path>>(input_path: P, options: &TransformOptions) -> Result<PathBuf> {
    let input_path = input_path.as_ref();
    if !input_path.exists() {
        return Err(Error::not_found("Input", input_path.display()));
    }

    let mut img = image::open(input_path)?;
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        "loaded {}",
        input_path.display()
    );

    if let Some(crop) = &options.crop {
        img = apply_crop(img, crop)?;
    }
    if let Some(dims) = &options.resize {
        img = apply_resize(img, *dims, options.fit);
    }

    let format = resolve_format(input_path, options.format);
    let output_path = options
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(input_path, options, format));

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(&output_path)?;
    encode_to(&img, BufWriter::new(file), format, options.quality)?;

    Ok(std::path::absolute(&output_path)?)
}
