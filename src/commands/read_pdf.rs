//! `read-pdf`: PDF text extraction with automatic decryption

use crate::cli::ReadPdfArgs;
use crate::error::{Error, Result};
use crate::pdf::{crypt, reader};
use std::path::{Path, PathBuf};

/// Default output name for `--decrypt-only`: `report.pdf` becomes
/// `report.decrypted.pdf`; a missing `.pdf` extension gets the suffix
/// appended so the input is never overwritten.
fn decrypted_path(input: &Path) -> PathBuf {
    let is_pdf = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        input.with_extension("decrypted.pdf")
    } else {
        let mut name = input.as_os_str().to_os_string();
        name.push(".decrypted.pdf");
        PathBuf::from(name)
    }
}

fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn run(args: ReadPdfArgs) -> Result<()> {
    if !args.pdf_file.exists() {
        return Err(Error::not_found("PDF", args.pdf_file.display()));
    }

    let mut data = std::fs::read(&args.pdf_file)?;
    let encrypted = crypt::is_encrypted(&data);
    let mut decrypted = false;

    if encrypted && !args.skip_decryption {
        data = crypt::decrypt(&data, None)?;
        decrypted = true;
        tracing::info!("decrypted {}", args.pdf_file.display());
    }

    // Decrypt-only mode: save the decrypted PDF and print its path.
    if args.decrypt_only {
        let output_path = args
            .output
            .clone()
            .unwrap_or_else(|| decrypted_path(&args.pdf_file));
        write_output(&output_path, &data)?;
        println!("{}", std::path::absolute(&output_path)?.display());
        return Ok(());
    }

    let text = reader::extract_text(&data, None)?;
    let total_pages = text.page_count();

    let body = match &args.pages {
        Some(range) => {
            let pages = reader::parse_page_range(range, total_pages)?;
            text.select_pages(&pages)
        }
        None => text.full_text(),
    };

    let enc_status = match (encrypted, decrypted) {
        (false, _) => "No",
        (true, true) => "Yes (decrypted)",
        (true, false) => "Yes (skipped)",
    };
    let output = format!("Pages: {total_pages} | Encrypted: {enc_status}\n---\n{body}");

    match &args.output {
        Some(path) => {
            write_output(path, output.as_bytes())?;
            println!("{}", std::path::absolute(path)?.display());
        }
        None => println!("{output}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decrypted_path_replaces_pdf_extension() {
        assert_eq!(
            decrypted_path(Path::new("forms/i-90.pdf")),
            PathBuf::from("forms/i-90.decrypted.pdf")
        );
        assert_eq!(
            decrypted_path(Path::new("REPORT.PDF")),
            PathBuf::from("REPORT.decrypted.pdf")
        );
    }

    #[test]
    fn test_decrypted_path_appends_when_not_pdf() {
        assert_eq!(
            decrypted_path(Path::new("download.bin")),
            PathBuf::from("download.bin.decrypted.pdf")
        );
    }
}
