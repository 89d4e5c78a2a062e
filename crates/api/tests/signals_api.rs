use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use api::{router, AppState, WEBHOOK_SECRET_HEADER};
use common::{NewSignal, SignalAction, SignalCategory, SignalRepository};
use store::{FavoriteLedger, MemoryPreferences, MemorySignalStore};

const SECRET: &str = "test-secret";

struct Harness {
    app: Router,
    store: Arc<MemorySignalStore>,
    ledger: FavoriteLedger,
}

fn harness() -> Harness {
    let store = Arc::new(MemorySignalStore::new());
    let ledger = FavoriteLedger::new(Arc::new(MemoryPreferences::new()));
    let state = AppState {
        signals: store.clone(),
        ledger: ledger.clone(),
        webhook_secret: SECRET.to_string(),
    };
    Harness {
        app: router(state),
        store,
        ledger,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_signal(secret: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/signals")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header(WEBHOOK_SECRET_HEADER, secret);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn patch(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_signals() -> Request<Body> {
    Request::builder().uri("/signals").body(Body::empty()).unwrap()
}

#[tokio::test]
async fn webhook_creates_signal_visible_in_list() {
    let h = harness();
    let (status, created) = send(
        &h.app,
        post_signal(
            Some(SECRET),
            r#"{"ticker":"btcusdt","price":68500.75,"action":"buy","category":"crypto"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ticker"], "BTCUSDT");
    assert_eq!(created["isFavorite"], false);
    assert!(created["time"].is_string());

    let (status, list) = send(&h.app, get_signals()).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], created["id"]);
}

#[tokio::test]
async fn webhook_keeps_explicit_time() {
    let h = harness();
    let (status, created) = send(
        &h.app,
        post_signal(
            Some(SECRET),
            r#"{"ticker":"EURUSD","price":1.085,"action":"sell","category":"forex","time":"2024-05-01T12:00:00Z"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["time"], "2024-05-01T12:00:00Z");
}

#[tokio::test]
async fn wrong_secret_is_unauthorized_and_store_unchanged() {
    let h = harness();
    let body = r#"{"ticker":"BTCUSDT","price":1.0,"action":"buy","category":"crypto"}"#;

    let (status, response) = send(&h.app, post_signal(Some("nope"), body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["message"], "Unauthorized");

    let (status, _) = send(&h.app, post_signal(None, body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(h.store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_payload_returns_field_errors() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        post_signal(
            Some(SECRET),
            r#"{"ticker":"","price":-1,"action":"hold","category":"crypto"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid signal data");
    assert!(body["errors"]["ticker"].is_array());
    assert!(body["errors"]["price"].is_array());
    assert!(body["errors"]["action"].is_array());
    assert!(body["errors"].get("category").is_none());
    assert_eq!(h.store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let h = harness();
    let (status, body) = send(&h.app, post_signal(Some(SECRET), "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON payload");
}

#[tokio::test]
async fn webhook_defaults_favorite_from_ledger() {
    let h = harness();
    h.ledger.add("SOLUSDT").await.unwrap();

    let (_, created) = send(
        &h.app,
        post_signal(
            Some(SECRET),
            r#"{"ticker":"solusdt","price":150.5,"action":"buy","category":"crypto"}"#,
        ),
    )
    .await;
    assert_eq!(created["isFavorite"], true);
}

#[tokio::test]
async fn list_is_newest_first_by_time() {
    let h = harness();
    let older = chrono::Utc::now() - chrono::Duration::hours(2);
    let newer = chrono::Utc::now() - chrono::Duration::minutes(1);

    // Insert the newer one first so insertion order and time order disagree.
    h.store
        .append(NewSignal::new("ETHUSDT", 3600.2, SignalAction::Sell, SignalCategory::Crypto).at(newer))
        .await
        .unwrap();
    h.store
        .append(NewSignal::new("XAUUSD", 2350.0, SignalAction::Buy, SignalCategory::Commodities).at(older))
        .await
        .unwrap();

    let (_, list) = send(&h.app, get_signals()).await;
    let tickers: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["ticker"].as_str().unwrap())
        .collect();
    assert_eq!(tickers, vec!["ETHUSDT", "XAUUSD"]);
}

#[tokio::test]
async fn patch_single_favorite_updates_record() {
    let h = harness();
    let signal = h
        .store
        .append(NewSignal::new("EURUSD", 1.085, SignalAction::Sell, SignalCategory::Forex))
        .await
        .unwrap();

    let (status, body) = send(
        &h.app,
        patch(&format!("/signals/{}/favorite", signal.id), json!({"isFavorite": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], signal.id.as_str());
    assert_eq!(body["isFavorite"], true);
}

#[tokio::test]
async fn patch_single_favorite_unknown_id_is_not_found() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        patch("/signals/does-not-exist/favorite", json!({"isFavorite": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Signal not found");
}

#[tokio::test]
async fn patch_single_favorite_rejects_bad_body() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        patch("/signals/any/favorite", json!({"isFavorite": "yes"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn favorite_all_propagates_to_every_signal_of_ticker() {
    let h = harness();
    for _ in 0..2 {
        h.store
            .append(NewSignal::new("BTCUSDT", 68000.0, SignalAction::Buy, SignalCategory::Crypto))
            .await
            .unwrap();
    }
    h.store
        .append(NewSignal::new("EURUSD", 1.085, SignalAction::Sell, SignalCategory::Forex))
        .await
        .unwrap();

    let (status, body) = send(
        &h.app,
        patch("/signals/ticker/btcusdt/favorite-all", json!({"isFavorite": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["message"], "Successfully updated 2 signals for BTCUSDT.");
    assert!(h.ledger.is_favorited("BTCUSDT").await.unwrap());

    let (_, list) = send(&h.app, get_signals()).await;
    for s in list.as_array().unwrap() {
        let expected = s["ticker"] == "BTCUSDT";
        assert_eq!(s["isFavorite"], expected);
    }
}

#[tokio::test]
async fn favorite_all_for_unknown_ticker_counts_zero() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        patch("/signals/ticker/DOGEUSDT/favorite-all", json!({"isFavorite": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn healthz_reports_signal_count() {
    let h = harness();
    store::seed_demo_signals(h.store.as_ref()).await.unwrap();

    let (status, body) = send(
        &h.app,
        Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["signals"], 5);
}
