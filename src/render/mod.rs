//! Browser-based HTML rendering

pub mod browser;
pub mod html;

pub use browser::BrowserSession;
pub use html::{html_to_png, inject_tailwind, RenderOptions};
