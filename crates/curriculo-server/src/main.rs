//! curriculo-backend server binary

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curriculo_server::{config::Config, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before anything reads it
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let port = config.port;

    if config.webhook_secret.is_some() {
        tracing::info!(
            mode = config.signature_mode.as_str(),
            "✓ Webhook secret configured"
        );
    } else {
        tracing::warn!("⚠ MP_WEBHOOK_SECRET not set - webhook signatures are not checked");
    }
    tracing::info!(
        notification_url = %config.mercado_pago.notification_url(),
        preview_url = %config.preview_url,
        webhook_log = %config.webhook_log_path.display(),
        "Configuration loaded"
    );

    let state = AppState::from_config(config).context("failed to build application state")?;
    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 curriculo-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health             - Health check");
    tracing::info!("  POST /criar-preferencia  - Create Checkout Pro preference");
    tracing::info!("  POST /criar-pagamento    - Create Pix payment");
    tracing::info!("  POST /process_payment    - Create Pix payment (alias)");
    tracing::info!("  POST /check-payment      - Poll payment status");
    tracing::info!("  POST /webhook            - Mercado Pago notifications");
    tracing::info!("  GET  /gerar-pdf          - Export résumé PDF");
    tracing::info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
