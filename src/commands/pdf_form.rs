//! `pdf-form`: fillable-PDF form fields to structured JSON

use crate::cli::PdfFormArgs;
use crate::error::Result;
use crate::pdf::{extract_form_document, FormExtractOptions};

pub async fn run(args: PdfFormArgs) -> Result<()> {
    let options = FormExtractOptions {
        skip_decryption: args.skip_decryption,
    };

    let document = extract_form_document(&args.pdf_file, &options).await?;

    let pretty = !args.no_pretty;
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, &json)?;
            println!("{}", std::path::absolute(path)?.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
