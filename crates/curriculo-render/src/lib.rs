//! # curriculo-render
//!
//! Renders a web page to PDF with a headless browser.
//!
//! ## Launchers
//!
//! - **Chromium** (default): local headless Chromium via the DevTools protocol
//!
//! Each render launches its own browser process, waits for network idle so
//! client-side rendering has finished, prints an A4 PDF and tears the browser
//! down, on success, failure or timeout alike.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use curriculo_render::{ChromiumLauncher, PdfRenderer, RenderConfig};
//!
//! let renderer = PdfRenderer::new(ChromiumLauncher::default(), RenderConfig::default());
//! let pdf = renderer.render("https://curriculospara.vercel.app/preview").await?;
//! ```

pub mod error;
pub mod renderer;

#[cfg(feature = "chromium")]
pub mod chromium;

#[cfg(feature = "chromium")]
pub use chromium::{ChromiumLauncher, ChromiumSession};

pub use error::{RenderError, Result};
pub use renderer::{
    BrowserLauncher, BrowserSession, Margins, PageRenderer, PdfOptions, PdfRenderer, RenderConfig,
};
