use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bme680_service::{
    api,
    config::{Config, RetentionPolicy},
    db,
    service::ReadingService,
    store::PgReadingStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; variables may also be set externally
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // Connect to DB and run migrations
    let pool = db::create_pool(&config.store).await?;
    db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    info!(
        max_connections = config.store.max_connections,
        timeout_ms = config.store.timeout.as_millis() as u64,
        "Database ready"
    );

    match config.store.retention {
        RetentionPolicy::Unbounded => {
            info!("Retention policy: unbounded (readings are never deleted)")
        }
    }

    let store = PgReadingStore::new(pool, config.store.timeout);
    let service = ReadingService::new(Arc::new(store));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

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
