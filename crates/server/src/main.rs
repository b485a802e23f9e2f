mod analyzer;
mod api;
mod app;
mod bootstrap;
mod health;
mod session;
mod site;

use anyhow::Result;
use energia_core::config::{AppConfig, LoadOptions};
use tracing::{info, warn};

fn init_logging(config: &AppConfig) {
    use energia_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let application = bootstrap::bootstrap_with_config(config).await?;
    let templates = app::init_templates(&application.config.site.templates_dir);
    let listen_address = application.config.server.listen_address();
    let shutdown_grace = application.config.server.shutdown_grace();
    let state = app::AppState::new(application.config, application.db_pool, templates);

    let listener = tokio::net::TcpListener::bind(&listen_address).await?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        listen_address = %listen_address,
        "energia-server listening"
    );

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let server = tokio::spawn(async move {
        axum::serve(listener, app::router(state))
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    wait_for_shutdown().await?;
    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = shutdown_grace.as_secs(),
        "energia-server stopping"
    );
    stop_tx.send_replace(true);

    match tokio::time::timeout(shutdown_grace, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(
            event_name = "system.server.shutdown_timeout",
            correlation_id = "shutdown",
            "in-flight requests did not drain before the grace period elapsed"
        ),
    }

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
