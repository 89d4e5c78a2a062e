use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use common::{
    BulkFavoriteResult, Error, FavoriteUpdate, FieldErrors, NewSignal, Result, Signal,
};

use crate::backend::SignalsBackend;

/// Header carrying the webhook shared secret.
pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

/// HTTP client for the signals API.
#[derive(Clone)]
pub struct HttpSignalsClient {
    http: Client,
    base_url: Url,
    /// Required only for `submit_signal`.
    webhook_secret: Option<String>,
}

impl HttpSignalsClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid signals API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "signals API URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            webhook_secret: None,
        })
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl SignalsBackend for HttpSignalsClient {
    async fn fetch_signals(&self) -> Result<Vec<Signal>> {
        let response = self
            .http
            .get(self.endpoint(&["signals"]))
            .send()
            .await
            .map_err(network)?;
        read(response).await
    }

    async fn submit_signal(&self, signal: &NewSignal) -> Result<Signal> {
        let mut request = self.http.post(self.endpoint(&["signals"])).json(signal);
        if let Some(secret) = &self.webhook_secret {
            request = request.header(WEBHOOK_SECRET_HEADER, secret);
        }

        let response = request.send().await.map_err(network)?;
        let created: Signal = read(response).await?;
        debug!(id = %created.id, ticker = %created.ticker, "Signal submitted");
        Ok(created)
    }

    async fn set_signal_favorite(&self, id: &str, is_favorite: bool) -> Result<Signal> {
        let response = self
            .http
            .patch(self.endpoint(&["signals", id, "favorite"]))
            .json(&FavoriteUpdate { is_favorite })
            .send()
            .await
            .map_err(network)?;
        read(response).await
    }

    async fn set_ticker_favorite(&self, ticker: &str, is_favorite: bool) -> Result<usize> {
        let response = self
            .http
            .patch(self.endpoint(&["signals", "ticker", ticker, "favorite-all"]))
            .json(&FavoriteUpdate { is_favorite })
            .send()
            .await
            .map_err(network)?;
        let result: BulkFavoriteResult = read(response).await?;
        debug!(%ticker, is_favorite, count = result.count, "Ticker favorite confirmed");
        Ok(result.count)
    }
}

fn network(e: reqwest::Error) -> Error {
    Error::Network(e.to_string())
}

/// Decode a success body, or turn an error response back into a domain error.
async fn read<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(network);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();

    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized,
        StatusCode::NOT_FOUND => Error::NotFound("Signal".into()),
        StatusCode::BAD_REQUEST => match body.get("errors").cloned() {
            Some(errors) => serde_json::from_value::<FieldErrors>(errors)
                .map(Error::Validation)
                .unwrap_or_else(|_| Error::field("body", message)),
            None if message == "Invalid JSON payload" => Error::InvalidJson,
            None => Error::field("body", message),
        },
        _ => Error::Network(format!("{status}: {message}")),
    })
}
