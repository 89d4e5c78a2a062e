use async_trait::async_trait;

use common::{NewSignal, Result, Signal};

/// The remote signals service as seen by the dashboard.
///
/// `HttpSignalsClient` implements this against the HTTP API. `Dashboard`
/// only ever talks to an `Arc<dyn SignalsBackend>`, so the confirmation
/// step of a favorite toggle can fail independently of local state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalsBackend: Send + Sync {
    /// All signals, newest first.
    async fn fetch_signals(&self) -> Result<Vec<Signal>>;

    /// Push a new signal through the webhook.
    async fn submit_signal(&self, signal: &NewSignal) -> Result<Signal>;

    async fn set_signal_favorite(&self, id: &str, is_favorite: bool) -> Result<Signal>;

    /// Set the favorite flag on every stored signal of `ticker`.
    /// Returns the number of signals updated.
    async fn set_ticker_favorite(&self, ticker: &str, is_favorite: bool) -> Result<usize>;
}
