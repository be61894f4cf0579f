//! kvcache - A key-value service fronting PostgreSQL with a bounded cache
//!
//! Serves `GET`/`PUT`/`DELETE /kv/{key}` backed by a durable store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kvcache::api::create_router;
use kvcache::config::StoreBackend;
use kvcache::store::{KvStore, MemoryStore, PostgresStore};
use kvcache::{spawn_stats_reporter, AppState, Config};

/// Main entry point for the key-value server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to the store and ensure the schema exists
/// 4. Create the cache and start the stats reporter
/// 5. Serve HTTP until SIGINT/SIGTERM, then stop the reporter
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting kvcache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_capacity={}, port={}, stats_interval={}s, store={:?}",
        config.cache_capacity, config.server_port, config.stats_interval, config.store_backend
    );

    let store: Arc<dyn KvStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let store = PostgresStore::from_config(&config.db)?;
            store.ensure_schema().await.with_context(|| {
                format!(
                    "failed to reach PostgreSQL at {}:{}/{}",
                    config.db.host, config.db.port, config.db.dbname
                )
            })?;
            info!("Connected to PostgreSQL at {}:{}", config.db.host, config.db.port);
            Arc::new(store)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::from_config(&config, store);
    info!("Cache initialized");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = spawn_stats_reporter(state.cache().clone(), config.stats_period(), shutdown_rx);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let _ = shutdown_tx.send(true);
    reporter.await.context("stats reporter panicked")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
