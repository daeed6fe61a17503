//! `generate-image`: text prompt (plus optional reference images) to file

use crate::cli::GenerateImageArgs;
use crate::error::Result;
use crate::genai::{resolve_reference_images, GeminiClient};
use crate::imageops::DEFAULT_OUTPUT_DIR;
use std::path::PathBuf;

pub async fn run(args: GenerateImageArgs) -> Result<()> {
    let references = resolve_reference_images(&args.refs)?;
    let client = GeminiClient::from_env(args.model)?;

    let image = client.generate_image(&args.prompt, &references).await?;

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    std::fs::create_dir_all(&output_dir)?;

    let filename = args
        .filename
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let output_path = output_dir.join(format!("{filename}.{}", image.extension()));
    std::fs::write(&output_path, &image.data)?;

    tracing::info!(bytes = image.data.len(), "image saved");
    println!("{}", std::path::absolute(&output_path)?.display());
    Ok(())
}
