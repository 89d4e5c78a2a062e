use async_trait::async_trait;

use crate::{NewSignal, Result, Signal};

/// Storage for signals.
///
/// `MemorySignalStore` in `crates/store` implements this for the running
/// service. Handlers hold an `Arc<dyn SignalRepository>` so the backing store
/// can be swapped without touching the routes.
#[async_trait]
pub trait SignalRepository: Send + Sync {
    /// Create a signal from a validated submission and insert it newest-first.
    /// `time` and `is_favorite` must already be resolved by the caller.
    async fn append(&self, signal: NewSignal) -> Result<Signal>;

    /// All signals, newest-inserted first.
    async fn list(&self) -> Result<Vec<Signal>>;

    async fn get_by_id(&self, id: &str) -> Result<Signal>;

    /// All signals whose ticker matches case-insensitively.
    async fn list_by_ticker(&self, ticker: &str) -> Result<Vec<Signal>>;

    /// Set the favorite flag on exactly one signal.
    async fn update_favorite_by_id(&self, id: &str, is_favorite: bool) -> Result<Signal>;

    /// Set the favorite flag on every signal of a ticker. Returns the number updated.
    async fn update_favorite_by_ticker(&self, ticker: &str, is_favorite: bool) -> Result<usize>;

    async fn len(&self) -> Result<usize>;
}

/// String key-value persistence for preferences.
///
/// The favorite ledger keeps its whole state under a single key.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}
