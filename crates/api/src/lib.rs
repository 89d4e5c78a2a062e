mod auth;
mod error;
pub mod ingress;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::SignalRepository;
use store::FavoriteLedger;

pub use auth::WEBHOOK_SECRET_HEADER;
pub use error::ApiError;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub signals: Arc<dyn SignalRepository>,
    /// Server-side favorite ledger: defaults `isFavorite` on ingress and
    /// annotates reads.
    pub ledger: FavoriteLedger,
    pub webhook_secret: String,
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::signals_router(state.clone()))
        .merge(routes::health_router())
        .with_state(state)
        .layer(cors)
}

/// Build and run the Axum API server until the listener fails.
pub async fn serve(state: AppState, port: u16) -> common::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Signals API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
