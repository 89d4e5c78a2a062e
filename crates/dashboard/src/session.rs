use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tracing::{error, info, warn};

use common::{normalize_ticker, Error, NewSignal, Result, Signal};
use store::FavoriteLedger;

use crate::backend::SignalsBackend;
use crate::view::{self, SignalPage, ViewQuery};

/// Client-side dashboard state: the last fetched snapshot of signals, the
/// client's own favorite ledger, and the backend used to confirm changes.
pub struct Dashboard {
    backend: Arc<dyn SignalsBackend>,
    ledger: FavoriteLedger,
    signals: Vec<Signal>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn SignalsBackend>, ledger: FavoriteLedger) -> Self {
        Self {
            backend,
            ledger,
            signals: Vec::new(),
        }
    }

    /// Current snapshot, as last fetched and locally patched.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn ledger(&self) -> &FavoriteLedger {
        &self.ledger
    }

    /// Re-fetch every signal and annotate `isFavorite` from the local ledger.
    pub async fn refresh(&mut self) -> Result<usize> {
        let mut signals = self.backend.fetch_signals().await?;
        let favorites = self.ledger.tickers().await?;
        for signal in &mut signals {
            signal.is_favorite = favorites.contains(&normalize_ticker(&signal.ticker));
        }

        self.signals = signals;
        Ok(self.signals.len())
    }

    /// Derive one page of the current snapshot. Calendar days use `tz`.
    pub fn view<Tz: TimeZone>(&self, query: &ViewQuery, tz: &Tz) -> SignalPage {
        view::derive(&self.signals, query, tz)
    }

    /// Flip the favorite state of the ticker behind signal `id`.
    ///
    /// The new state is applied locally and written to the ledger before the
    /// backend confirms it. If confirmation fails both are restored to their
    /// pre-toggle values and the backend error is returned.
    pub async fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
        let ticker = self
            .signals
            .iter()
            .find(|s| s.id == id)
            .map(|s| normalize_ticker(&s.ticker))
            .ok_or_else(|| Error::NotFound("Signal".into()))?;

        let was_favorited = self.ledger.is_favorited(&ticker).await?;
        let favorited = !was_favorited;

        let patch = FavoritePatch::apply(&mut self.signals, &ticker, favorited);

        if let Err(e) = self.ledger.set(&ticker, favorited).await {
            patch.revert(&mut self.signals);
            return Err(e);
        }

        match self.backend.set_ticker_favorite(&ticker, favorited).await {
            Ok(count) => {
                info!(%ticker, favorited, count, "Favorite toggled");
                Ok(favorited)
            }
            Err(e) => {
                warn!(%ticker, error = %e, "Favorite confirmation failed, rolling back");
                patch.revert(&mut self.signals);
                if let Err(restore) = self.ledger.set(&ticker, was_favorited).await {
                    error!(%ticker, error = %restore, "Failed to restore favorite ledger");
                }
                Err(e)
            }
        }
    }

    /// Submit a signal the way a webhook would, pre-favorited when its ticker
    /// is on the local watchlist, then refresh the snapshot.
    pub async fn simulate(&mut self, mut signal: NewSignal) -> Result<Signal> {
        if signal.is_favorite.is_none() {
            signal.is_favorite = Some(self.ledger.is_favorited(&signal.ticker).await?);
        }
        signal.time.get_or_insert_with(Utc::now);

        let created = self.backend.submit_signal(&signal).await?;
        info!(ticker = %created.ticker, action = %created.action, "Simulated signal sent");
        self.refresh().await?;
        Ok(created)
    }
}

/// Inverse of an optimistic favorite update: the flag each touched signal had
/// before the update, keyed by signal id.
struct FavoritePatch {
    previous: HashMap<String, bool>,
}

impl FavoritePatch {
    fn apply(signals: &mut [Signal], ticker: &str, favorited: bool) -> Self {
        let mut previous = HashMap::new();
        for signal in signals.iter_mut().filter(|s| s.has_ticker(ticker)) {
            previous.insert(signal.id.clone(), signal.is_favorite);
            signal.is_favorite = favorited;
        }
        Self { previous }
    }

    fn revert(self, signals: &mut [Signal]) {
        for signal in signals.iter_mut() {
            if let Some(&was) = self.previous.get(&signal.id) {
                signal.is_favorite = was;
            }
        }
    }
}
