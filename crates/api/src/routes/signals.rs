use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use tracing::info;

use common::{normalize_ticker, BulkFavoriteResult, Error, Signal};

use crate::{
    auth::require_webhook_secret,
    error::ApiError,
    ingress::{parse_json, validate_favorite_update, validate_submission},
    AppState,
};

/// Signal routes. Only the webhook (`POST /signals`) requires the shared secret.
pub fn signals_router(state: AppState) -> Router<AppState> {
    let webhook = post(create_signal).route_layer(middleware::from_fn_with_state(
        state,
        require_webhook_secret,
    ));

    Router::new()
        .route("/signals", get(list_signals).merge(webhook))
        .route("/signals/:id/favorite", patch(update_signal_favorite))
        .route(
            "/signals/ticker/:ticker/favorite-all",
            patch(update_ticker_favorite),
        )
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// All signals, newest first by `time`, with `isFavorite` taken from the ledger.
async fn list_signals(State(state): State<AppState>) -> Result<Json<Vec<Signal>>, ApiError> {
    let favorites = state.ledger.tickers().await?;
    let mut signals = state.signals.list().await?;

    for signal in &mut signals {
        signal.is_favorite = favorites.contains(&signal.ticker);
    }
    signals.sort_by(|a, b| b.time.cmp(&a.time));

    Ok(Json(signals))
}

// ─── Webhook ingress ──────────────────────────────────────────────────────────

async fn create_signal(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Signal>), ApiError> {
    let payload = parse_json(&body)?;
    let mut new = validate_submission(&payload)?;

    if new.is_favorite.is_none() {
        new.is_favorite = Some(state.ledger.is_favorited(&new.ticker).await?);
    }
    new.time.get_or_insert_with(Utc::now);

    let signal = state.signals.append(new).await?;
    info!(
        id = %signal.id,
        ticker = %signal.ticker,
        action = %signal.action,
        price = signal.price,
        "New signal received and stored"
    );

    Ok((StatusCode::CREATED, Json(signal)))
}

// ─── Favorites ────────────────────────────────────────────────────────────────

async fn update_signal_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Signal>, ApiError> {
    let update = parse_json(&body)
        .and_then(|payload| validate_favorite_update(&payload))
        .map_err(ApiError::request_body)?;

    let signal = state
        .signals
        .update_favorite_by_id(&id, update.is_favorite)
        .await?;
    Ok(Json(signal))
}

async fn update_ticker_favorite(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    body: Bytes,
) -> Result<Json<BulkFavoriteResult>, ApiError> {
    let ticker = normalize_ticker(&ticker);
    if ticker.is_empty() {
        return Err(ApiError::request_body(Error::field(
            "ticker",
            "Ticker parameter is required",
        )));
    }

    let update = parse_json(&body)
        .and_then(|payload| validate_favorite_update(&payload))
        .map_err(ApiError::request_body)?;

    state.ledger.set(&ticker, update.is_favorite).await?;
    let count = state
        .signals
        .update_favorite_by_ticker(&ticker, update.is_favorite)
        .await?;

    info!(%ticker, is_favorite = update.is_favorite, count, "Ticker favorite propagated");
    Ok(Json(BulkFavoriteResult {
        message: format!("Successfully updated {count} signals for {ticker}."),
        count,
    }))
}
