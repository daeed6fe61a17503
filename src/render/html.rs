//! HTML to PNG rendering
//!
//! Reads an HTML file, injects the Tailwind CDN when the page doesn't carry
//! its own build, screenshots it through a browser session, and re-encodes
//! the capture as a best-compression PNG.

use crate::error::{Error, Result};
use crate::imageops;
use crate::render::browser::BrowserSession;
use std::path::{Path, PathBuf};

/// Session name shared by all render invocations.
const SESSION_NAME: &str = "html-render";

const TAILWIND_CDN: &str = r#"<script src="https://cdn.tailwindcss.com"></script>"#;

/// Milliseconds to let CDN scripts load before the screenshot.
const SETTLE_MILLIS: u64 = 2000;

/// Options for one render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub full_page: bool,
    pub output: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            full_page: false,
            output: None,
        }
    }
}

/// Inject the Tailwind CDN script unless the page already references a
/// tailwind build. Insertion point: end of head, start of head, else
/// prepended to the document.
pub fn inject_tailwind(html: &str) -> String {
    if html.contains("tailwindcss") || html.contains("tailwind.css") {
        return html.to_string();
    }
    if html.contains("</head>") {
        return html.replacen("</head>", &format!("{TAILWIND_CDN}\n</head>"), 1);
    }
    if html.contains("<head>") {
        return html.replacen("<head>", &format!("<head>\n{TAILWIND_CDN}"), 1);
    }
    format!("{TAILWIND_CDN}\n{html}")
}

/// Render an HTML file to a compressed PNG. Returns the absolute output path.
pub async fn html_to_png<P: AsRef<Path>>(html_file: P, options: &RenderOptions) -> Result<PathBuf> {
    let html_file = html_file.as_ref();
    if !html_file.exists() {
        return Err(Error::not_found("HTML", html_file.display()));
    }

    let html = inject_tailwind(&std::fs::read_to_string(html_file)?);

    // Temp dir holds both the processed HTML and the raw screenshot; dropped
    // (and deleted) on every exit path.
    let temp_dir = tempfile::Builder::new().prefix("html-render-").tempdir()?;
    let page_path = temp_dir.path().join(format!("{}.html", uuid::Uuid::new_v4()));
    let shot_path = temp_dir.path().join("screenshot.png");
    std::fs::write(&page_path, &html)?;

    let file_url = url::Url::from_file_path(&page_path).map_err(|_| Error::InvalidInput {
        reason: format!("Cannot build file URL for {}", page_path.display()),
    })?;

    let session = BrowserSession::new(SESSION_NAME)?;
    let captured = capture(&session, file_url.as_str(), &shot_path, options).await;
    // The session is closed even when a step failed.
    session.close_quietly().await;
    captured?;

    let output_path = options.output.clone().unwrap_or_else(|| {
        PathBuf::from(imageops::DEFAULT_OUTPUT_DIR).join(format!("{}.png", uuid::Uuid::new_v4()))
    });
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    imageops::recompress_png(&shot_path, &output_path)?;
    tracing::info!("rendered {} -> {}", html_file.display(), output_path.display());

    Ok(std::path::absolute(&output_path)?)
}

/// The browser steps proper, separated so cleanup can wrap them.
async fn capture(
    session: &BrowserSession,
    url: &str,
    shot_path: &Path,
    options: &RenderOptions,
) -> Result<()> {
    session.open(url).await?;
    session.set_viewport(options.width, options.height).await?;
    session.settle(SETTLE_MILLIS).await?;
    session.screenshot(shot_path, options.full_page).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inject_before_closing_head() {
        let html = "<html><head><title>t</title></head><body></body></html>";
        let injected = inject_tailwind(html);
        assert!(injected.contains(&format!("{TAILWIND_CDN}\n</head>")));
    }

    #[test]
    fn test_inject_after_opening_head_when_unclosed() {
        let html = "<html><head><body></body></html>";
        let injected = inject_tailwind(html);
        assert!(injected.contains(&format!("<head>\n{TAILWIND_CDN}")));
    }

    #[test]
    fn test_inject_prepends_without_head() {
        let html = "<div>bare fragment</div>";
        let injected = inject_tailwind(html);
        assert!(injected.starts_with(TAILWIND_CDN));
        assert!(injected.ends_with(html));
    }

    #[test]
    fn test_existing_tailwind_untouched() {
        let cdn = r#"<head><script src="https://cdn.tailwindcss.com"></script></head>"#;
        assert_eq!(inject_tailwind(cdn), cdn);

        let local = r#"<head><link rel="stylesheet" href="/tailwind.css"></head>"#;
        assert_eq!(inject_tailwind(local), local);
    }

    #[test]
    fn test_injection_happens_once() {
        let html = "<head></head><head></head>";
        let injected = inject_tailwind(html);
        assert_eq!(injected.matches("cdn.tailwindcss.com").count(), 1);
    }
}
