use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use common::{normalize_ticker, PreferenceStore, Result};

/// Key under which the favorited tickers are stored.
pub const FAVORITES_KEY: &str = "globalFavoriteTickersOnlySignals";

/// The set of tickers the user has marked as favorite.
///
/// The whole set lives as a JSON array under a single preference key. Entries
/// that fail to parse are discarded and read back as the empty set.
#[derive(Clone)]
pub struct FavoriteLedger {
    prefs: Arc<dyn PreferenceStore>,
    key: String,
    /// Serializes read-modify-write cycles on the stored set.
    write_lock: Arc<Mutex<()>>,
}

impl FavoriteLedger {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self::with_key(prefs, FAVORITES_KEY)
    }

    pub fn with_key(prefs: Arc<dyn PreferenceStore>, key: impl Into<String>) -> Self {
        Self {
            prefs,
            key: key.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All favorited tickers, uppercase.
    pub async fn tickers(&self) -> Result<BTreeSet<String>> {
        match self.load().await? {
            Some(tickers) => Ok(tickers),
            None => {
                let _guard = self.write_lock.lock().await;
                // A writer may have replaced the entry while we waited.
                match self.load().await? {
                    Some(tickers) => Ok(tickers),
                    None => {
                        self.reset().await;
                        Ok(BTreeSet::new())
                    }
                }
            }
        }
    }

    /// Stored set, or `None` when the entry does not parse.
    async fn load(&self) -> Result<Option<BTreeSet<String>>> {
        let Some(raw) = self.prefs.get(&self.key).await? else {
            return Ok(Some(BTreeSet::new()));
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(tickers) => Ok(Some(
                tickers
                    .iter()
                    .map(|t| normalize_ticker(t))
                    .filter(|t| !t.is_empty())
                    .collect(),
            )),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Corrupted favorite tickers, resetting");
                Ok(None)
            }
        }
    }

    /// Drop a corrupted entry. Caller holds `write_lock`.
    async fn reset(&self) {
        if let Err(e) = self.prefs.delete(&self.key).await {
            warn!(key = %self.key, error = %e, "Failed to clear corrupted favorite tickers");
        }
    }

    pub async fn is_favorited(&self, ticker: &str) -> Result<bool> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Ok(false);
        }
        Ok(self.tickers().await?.contains(&ticker))
    }

    pub async fn add(&self, ticker: &str) -> Result<()> {
        self.set(ticker, true).await
    }

    pub async fn remove(&self, ticker: &str) -> Result<()> {
        self.set(ticker, false).await
    }

    /// Add or remove `ticker`. A no-op when the set already agrees.
    pub async fn set(&self, ticker: &str, favorited: bool) -> Result<()> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;
        let mut tickers = match self.load().await? {
            Some(tickers) => tickers,
            None => {
                self.reset().await;
                BTreeSet::new()
            }
        };
        let changed = if favorited {
            tickers.insert(ticker.clone())
        } else {
            tickers.remove(&ticker)
        };
        if !changed {
            return Ok(());
        }

        let raw = serde_json::to_string(&tickers)?;
        self.prefs.set(&self.key, &raw).await?;
        debug!(%ticker, favorited, "Favorite ledger updated");
        Ok(())
    }
}
