use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::{Config, SignalRepository};
use dashboard::HttpSignalsClient;
use store::{seed_demo_signals, FavoriteLedger, MemorySignalStore, SqlitePreferences};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(port = cfg.port, "OnlySignals starting");

    // ── Database ──────────────────────────────────────────────────────────────
    let db = SqlitePool::connect(&cfg.database_url)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect to database: {e}"));
    sqlx::migrate!("../../migrations")
        .run(&db)
        .await
        .unwrap_or_else(|e| panic!("Database migration failed: {e}"));
    info!("Database ready");

    // ── Signal store ──────────────────────────────────────────────────────────
    let signals = Arc::new(MemorySignalStore::new());
    if cfg.seed_demo_signals {
        match seed_demo_signals(signals.as_ref()).await {
            Ok(count) => info!(count, "Demo signals seeded"),
            Err(e) => error!(error = %e, "Failed to seed demo signals"),
        }
    }

    // ── Favorite ledger ───────────────────────────────────────────────────────
    let ledger = FavoriteLedger::new(Arc::new(SqlitePreferences::new(db.clone())));
    match ledger.tickers().await {
        Ok(tickers) => info!(watchlist = tickers.len(), "Favorite ledger loaded"),
        Err(e) => error!(error = %e, "Failed to read favorite ledger"),
    }

    // ── API ───────────────────────────────────────────────────────────────────
    let api_state = api::AppState {
        signals: signals.clone() as Arc<dyn SignalRepository>,
        ledger,
        webhook_secret: cfg.webhook_secret.clone(),
    };

    // ── Simulated webhook traffic ─────────────────────────────────────────────
    if let Some(secs) = cfg.simulate_interval_secs {
        let base_url = format!("http://127.0.0.1:{}", cfg.port);
        match HttpSignalsClient::new(&base_url) {
            Ok(client) => {
                let client = client.with_webhook_secret(cfg.webhook_secret.clone());
                tokio::spawn(dashboard::simulate::run(
                    Arc::new(client),
                    Duration::from_secs(secs),
                ));
            }
            Err(e) => error!(error = %e, "Signal simulator disabled"),
        }
    }

    // ── Spawn server ──────────────────────────────────────────────────────────
    let port = cfg.port;
    tokio::spawn(async move {
        if let Err(e) = api::serve(api_state, port).await {
            error!(error = %e, "Signals API stopped");
        }
    });

    // Keep main alive
    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    info!("Shutdown signal received. Exiting.");
}
