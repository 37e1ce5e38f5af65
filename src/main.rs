use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use comfortcheck_service::{
    api,
    config::Config,
    context::AppContext,
    devices::DeviceRegistry,
    notifications::AlertWatcher,
    readings::ReadingGenerator,
    storage::JsonFileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent — env vars may be set externally)
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let store = JsonFileStore::new(config.data_dir.clone());
    info!(data_dir = %store.dir().display(), "Using JSON file store");

    let ctx = AppContext::new(Arc::new(store), ReadingGenerator::with_reference_rooms())
        .await
        .with_devices(DeviceRegistry::with_reference_devices(
            chrono::Utc::now(),
            config.device_scan_duration(),
        ));

    // Subscribe before the first tick so no snapshot is missed
    let alerts = {
        let watcher = AlertWatcher::new(
            ctx.pipeline.clone(),
            ctx.preferences.clone(),
            ctx.notifications.clone(),
        )
        .await;
        tokio::spawn(watcher.run())
    };

    ctx.pipeline.start().await;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(ctx.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ctx.pipeline.stop().await;
    if let Err(e) = alerts.await {
        tracing::warn!(error = %e, "Alert watcher ended abnormally");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
