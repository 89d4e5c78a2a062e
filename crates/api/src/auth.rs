use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use common::Error;

use crate::{error::ApiError, AppState};

pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

/// Middleware that rejects webhook calls whose shared secret does not match.
/// Runs before the body is read, so a rejected call never touches the store.
pub async fn require_webhook_secret(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(secret) if secret == state.webhook_secret => next.run(request).await,
        Some(_) => {
            warn!("Unauthorized webhook attempt: secret mismatch");
            ApiError::from(Error::Unauthorized).into_response()
        }
        None => {
            warn!("Unauthorized webhook attempt: missing {WEBHOOK_SECRET_HEADER} header");
            ApiError::from(Error::Unauthorized).into_response()
        }
    }
}
