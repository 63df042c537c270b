//! Page-to-PDF Strategy
//!
//! `PdfRenderer` owns the render sequence (launch, capture under a timeout,
//! teardown) while `BrowserLauncher`/`BrowserSession` hide which browser does
//! the work. The HTTP layer only sees `PageRenderer`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{RenderError, Result};

const MM_PER_INCH: f64 = 25.4;

/// Margins in millimetres
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// PDF layout options
#[derive(Clone, Debug, PartialEq)]
pub struct PdfOptions {
    /// Paper width in millimetres
    pub paper_width_mm: f64,

    /// Paper height in millimetres
    pub paper_height_mm: f64,

    /// Print CSS backgrounds
    pub print_background: bool,

    pub margins: Margins,
}

impl Default for PdfOptions {
    /// A4 with backgrounds, 20 mm top/bottom and 10 mm side margins.
    fn default() -> Self {
        Self {
            paper_width_mm: 210.0,
            paper_height_mm: 297.0,
            print_background: true,
            margins: Margins {
                top: 20.0,
                right: 10.0,
                bottom: 20.0,
                left: 10.0,
            },
        }
    }
}

impl PdfOptions {
    /// DevTools expresses paper and margins in inches.
    pub fn to_inches(mm: f64) -> f64 {
        mm / MM_PER_INCH
    }
}

/// Renderer configuration
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Explicit browser executable; auto-detected when `None`
    pub executable: Option<PathBuf>,

    /// Upper bound for navigation, network idle and capture
    pub timeout: Duration,

    pub pdf: PdfOptions,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            executable: None,
            timeout: Duration::from_secs(60),
            pdf: PdfOptions::default(),
        }
    }
}

/// Starts an isolated browser process
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session>;
}

/// One live browser process
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to `url`, wait for network idle and print the page.
    async fn print_to_pdf(&mut self, url: &str, options: &PdfOptions) -> Result<Vec<u8>>;

    /// Tear the browser down. Called on every path, including failures.
    async fn shutdown(&mut self) -> Result<()>;
}

/// What the HTTP layer depends on
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render_pdf(&self, url: &str) -> Result<Vec<u8>>;
}

/// Process-per-render PDF renderer
pub struct PdfRenderer<L: BrowserLauncher> {
    launcher: L,
    config: RenderConfig,
}

impl<L: BrowserLauncher> PdfRenderer<L> {
    pub fn new(launcher: L, config: RenderConfig) -> Self {
        Self { launcher, config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Launch, capture under the timeout, then always shut the browser down.
    pub async fn render(&self, url: &str) -> Result<Vec<u8>> {
        let started = std::time::Instant::now();
        let mut session = self.launcher.launch().await?;

        let outcome = tokio::time::timeout(
            self.config.timeout,
            session.print_to_pdf(url, &self.config.pdf),
        )
        .await;

        if let Err(e) = session.shutdown().await {
            tracing::warn!(error = %e, "Browser shutdown reported an error");
        }

        match outcome {
            Ok(Ok(pdf)) => {
                tracing::info!(url, bytes = pdf.len(), elapsed_ms = started.elapsed().as_millis() as u64, "Rendered PDF");
                Ok(pdf)
            }
            Ok(Err(e)) => {
                tracing::error!(url, error = %e, "PDF render failed");
                Err(e)
            }
            Err(_) => {
                tracing::error!(url, timeout = ?self.config.timeout, "PDF render timed out");
                Err(RenderError::Timeout(self.config.timeout))
            }
        }
    }
}

#[async_trait]
impl<L: BrowserLauncher> PageRenderer for PdfRenderer<L> {
    async fn render_pdf(&self, url: &str) -> Result<Vec<u8>> {
        self.render(url).await
    }
}
