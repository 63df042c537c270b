//! Application State

use std::sync::Arc;

use curriculo_payments::{
    FileWebhookLog, MercadoPagoClient, PaymentGateway, SignatureMode, WebhookSink, WebhookVerifier,
};
use curriculo_render::{ChromiumLauncher, PageRenderer, PdfRenderer};

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration read at startup
    pub config: Arc<Config>,

    /// Payment provider (Mercado Pago in production)
    pub gateway: Arc<dyn PaymentGateway>,

    /// Page-to-PDF renderer for the résumé preview
    pub renderer: Arc<dyn PageRenderer>,

    /// Webhook audit log
    pub webhook_log: Arc<dyn WebhookSink>,

    /// Signature verifier (None when signatures are not checked)
    pub verifier: Option<Arc<WebhookVerifier>>,
}

impl AppState {
    /// Assemble state from already-built components
    pub fn new(
        config: Config,
        gateway: Arc<dyn PaymentGateway>,
        renderer: Arc<dyn PageRenderer>,
        webhook_log: Arc<dyn WebhookSink>,
    ) -> Self {
        let verifier = match (&config.webhook_secret, config.signature_mode) {
            (Some(secret), SignatureMode::Log | SignatureMode::Enforce) => {
                Some(Arc::new(WebhookVerifier::new(secret.clone())))
            }
            _ => None,
        };

        Self {
            config: Arc::new(config),
            gateway,
            renderer,
            webhook_log,
            verifier,
        }
    }

    /// Production wiring: Mercado Pago, headless Chromium and a file log
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let gateway = MercadoPagoClient::new(config.mercado_pago.clone())?;

        let renderer = PdfRenderer::new(
            ChromiumLauncher::new(config.render.executable.clone()),
            config.render.clone(),
        );

        let mut webhook_log = FileWebhookLog::new(config.webhook_log_path.clone());
        if let Some(max_bytes) = config.webhook_log_max_bytes {
            webhook_log = webhook_log.with_max_bytes(max_bytes);
        }

        Ok(Self::new(
            config,
            Arc::new(gateway),
            Arc::new(renderer),
            Arc::new(webhook_log),
        ))
    }
}
