//! WH Helper webhook server
//!
//! Serves the Telegram webhook and keeps the snapshot fresh in the background.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wh_helper::{
    error::Result,
    models::{Config, Snapshot},
    pipeline,
    server::{self, AppState, TelegramClient},
    services::{Aggregator, RandomPicker, Responder},
    storage::SnapshotStore,
};

const CONFIG_ENV: &str = "WH_HELPER_CONFIG";
const DEFAULT_CONFIG: &str = "data/config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let loaded = Config::load(&config_path);
    let mut config = loaded.as_ref().ok().cloned().unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    if let Err(e) = &loaded {
        warn!(path = %config_path, error = %e, "Config load failed, using defaults");
    }
    config.apply_env_overrides();
    config.validate()?;

    let aggregator = Arc::new(Aggregator::from_config(&config)?);
    let store = Arc::new(SnapshotStore::new(Snapshot::with_defaults(Utc::now())));
    let refresh = pipeline::spawn_refresh_loop(
        aggregator,
        store.clone(),
        Duration::from_secs(config.schedule.refresh_interval_secs),
    );

    let telegram = TelegramClient::from_config(&config.server, &config.fetcher)?;
    if telegram.is_none() {
        warn!("TELEGRAM_TOKEN is not set, webhook requests will fail");
    }

    let responder = Responder::new(&config.sources.program_url, RandomPicker);
    let app = server::create_router(AppState::new(store, responder, telegram));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "WH-HelperBot server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresh.abort();
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
