//! Headless Chromium launcher
//!
//! Implementation of `BrowserLauncher` on top of `chromiumoxide`.
//!
//! The sandbox is disabled (`--no-sandbox --disable-setuid-sandbox`) so the
//! browser starts inside restricted containers. This is a known relaxation
//! for that environment, not a recommendation.

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, NavigateParams, PrintToPdfParams, SetLifecycleEventsEnabledParams,
};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{RenderError, Result};
use crate::renderer::{BrowserLauncher, BrowserSession, PdfOptions};

/// Chromium fires this once a frame has had no network connections for 500 ms.
const NETWORK_IDLE: &str = "networkIdle";

/// Launches one headless Chromium per render
#[derive(Clone, Debug, Default)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(|e| RenderError::failure("browser config", e))
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| RenderError::failure("browser launch", e))?;

        // The CDP connection only makes progress while its handler is polled.
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler error");
                }
            }
        });

        tracing::debug!("Launched headless Chromium");

        Ok(ChromiumSession {
            browser,
            events,
            closed: false,
        })
    }
}

/// A running Chromium process and its CDP event loop
///
/// Dropping the session without `shutdown` (e.g. a cancelled request) still
/// kills the process: `Browser` kills its child on drop.
pub struct ChromiumSession {
    browser: Browser,
    events: JoinHandle<()>,
    closed: bool,
}

impl ChromiumSession {
    fn print_params(options: &PdfOptions) -> PrintToPdfParams {
        PrintToPdfParams {
            print_background: Some(options.print_background),
            paper_width: Some(PdfOptions::to_inches(options.paper_width_mm)),
            paper_height: Some(PdfOptions::to_inches(options.paper_height_mm)),
            margin_top: Some(PdfOptions::to_inches(options.margins.top)),
            margin_right: Some(PdfOptions::to_inches(options.margins.right)),
            margin_bottom: Some(PdfOptions::to_inches(options.margins.bottom)),
            margin_left: Some(PdfOptions::to_inches(options.margins.left)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn print_to_pdf(&mut self, url: &str, options: &PdfOptions) -> Result<Vec<u8>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::failure("open page", e))?;

        // Subscribe before navigating so no lifecycle event is missed.
        let mut lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| RenderError::failure("lifecycle listener", e))?;
        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| RenderError::failure("enable lifecycle events", e))?;

        let navigation = page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| RenderError::failure("navigate", e))?;
        if let Some(error_text) = &navigation.result.error_text {
            return Err(RenderError::Failure(format!("navigate to {url}: {error_text}")));
        }
        let loader_id = navigation.result.loader_id.clone();

        loop {
            let Some(event) = lifecycle.next().await else {
                return Err(RenderError::Failure("browser closed before the page settled".into()));
            };
            let same_navigation = loader_id.as_ref().is_none_or(|id| *id == event.loader_id);
            if event.name == NETWORK_IDLE && same_navigation {
                break;
            }
        }

        tracing::debug!(url, "Page reached network idle");

        page.pdf(Self::print_params(options))
            .await
            .map_err(|e| RenderError::failure("print to pdf", e))
    }

    async fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let close_result = self.browser.close().await;
        if let Err(e) = &close_result {
            tracing::warn!(error = %e, "Browser close failed, killing process");
            if let Some(Err(kill_err)) = self.browser.kill().await {
                tracing::error!(error = %kill_err, "Failed to kill browser process");
            }
        }

        let wait_result = self.browser.wait().await;
        self.events.abort();

        close_result.map_err(|e| RenderError::failure("browser close", e))?;
        wait_result.map_err(|e| RenderError::failure("browser wait", e))?;
        Ok(())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.events.abort();
    }
}
