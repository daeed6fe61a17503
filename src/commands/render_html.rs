//! `render-html`: HTML file to compressed PNG screenshot

use crate::cli::RenderHtmlArgs;
use crate::error::Result;
use crate::render::{html_to_png, RenderOptions};

pub async fn run(args: RenderHtmlArgs) -> Result<()> {
    let options = RenderOptions {
        width: args.width,
        height: args.height,
        full_page: args.full_page,
        output: args.output,
    };

    let output_path = html_to_png(&args.html_file, &options).await?;
    println!("{}", output_path.display());
    Ok(())
}
