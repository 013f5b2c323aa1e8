use std::sync::Arc;

use anyhow::Context;

use microbank_accounts::InMemoryAccountService;
use microbank_api::app::{self, AppServices};
use microbank_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    microbank_observability::init(&config.log.filter);

    let services = AppServices::new(Arc::new(InMemoryAccountService::new()), &config);
    let router = app::build_app(services, config.server.request_timeout());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        version = %config.build.version,
        "accounts service listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("accounts service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
