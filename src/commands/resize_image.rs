//! `resize-image`: resize, crop, or convert a single image

use crate::cli::ResizeImageArgs;
use crate::error::{Error, Result};
use crate::imageops::{self, TransformOptions};

pub fn run(args: ResizeImageArgs) -> Result<()> {
    if args.resize.is_none() && args.crop.is_none() && args.format.is_none() {
        return Err(Error::InvalidInput {
            reason: "Nothing to do: pass at least one of --resize, --crop, or --format"
                .to_string(),
        });
    }

    if let Some(gravity) = &args.gravity {
        if !matches!(gravity.as_str(), "center" | "centre") {
            tracing::warn!(gravity, "only center gravity is supported, using center");
        }
    }

    let options = TransformOptions {
        resize: args
            .resize
            .as_deref()
            .map(imageops::parse_dimensions)
            .transpose()?,
        crop: args
            .crop
            .as_deref()
            .map(imageops::parse_crop_spec)
            .transpose()?,
        fit: args.fit,
        format: args.format,
        quality: args.quality,
        output: args.output,
    };

    let output_path = imageops::transform(&args.image, &options)?;
    println!("{}", output_path.display());
    Ok(())
}
