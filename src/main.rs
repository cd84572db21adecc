use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use agent_chat::config::ChatConfig;
use agent_chat::{logging, router, state_from_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ChatConfig::from_env().context("invalid agent_chat configuration")?;
    let state = state_from_config(&config).context("failed to build chat backend")?;

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        addr = %listener.local_addr().context("listener address")?,
        variant = %config.variant,
        "agent chat listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated")?;

    info!("agent chat stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
