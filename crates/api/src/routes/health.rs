use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::{error::ApiError, AppState};

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint. No auth required.
async fn healthz(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let count = state.signals.len().await?;
    Ok(Json(json!({
        "status": "ok",
        "signals": count,
    })))
}
