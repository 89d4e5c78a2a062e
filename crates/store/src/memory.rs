use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{
    normalize_ticker, Error, NewSignal, Result, Signal, SignalRepository, MAX_SIGNALS,
};

/// Process-memory signal store.
///
/// Newest signals sit at the front. Once `capacity` is exceeded the back of
/// the deque is truncated, so eviction follows insertion order, not `time`.
pub struct MemorySignalStore {
    signals: RwLock<VecDeque<Signal>>,
    capacity: usize,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SIGNALS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "signal store capacity must be > 0");
        info!(capacity, "MemorySignalStore initialized");
        Self {
            signals: RwLock::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }
}

impl Default for MemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalRepository for MemorySignalStore {
    async fn append(&self, new: NewSignal) -> Result<Signal> {
        let signal = Signal {
            id: uuid::Uuid::new_v4().to_string(),
            ticker: normalize_ticker(&new.ticker),
            price: new.price,
            time: new.time.unwrap_or_else(Utc::now),
            action: new.action,
            category: new.category,
            is_favorite: new.is_favorite.unwrap_or(false),
        };

        let mut signals = self.signals.write().await;
        signals.push_front(signal.clone());
        if signals.len() > self.capacity {
            let evicted = signals.len() - self.capacity;
            signals.truncate(self.capacity);
            debug!(evicted, "Signal store over capacity, oldest entries dropped");
        }

        Ok(signal)
    }

    async fn list(&self) -> Result<Vec<Signal>> {
        Ok(self.signals.read().await.iter().cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Signal> {
        self.signals
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Signal".into()))
    }

    async fn list_by_ticker(&self, ticker: &str) -> Result<Vec<Signal>> {
        Ok(self
            .signals
            .read()
            .await
            .iter()
            .filter(|s| s.has_ticker(ticker))
            .cloned()
            .collect())
    }

    async fn update_favorite_by_id(&self, id: &str, is_favorite: bool) -> Result<Signal> {
        let mut signals = self.signals.write().await;
        let signal = signals
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound("Signal".into()))?;
        signal.is_favorite = is_favorite;
        Ok(signal.clone())
    }

    async fn update_favorite_by_ticker(&self, ticker: &str, is_favorite: bool) -> Result<usize> {
        let mut signals = self.signals.write().await;
        let mut count = 0;
        for signal in signals.iter_mut().filter(|s| s.has_ticker(ticker)) {
            signal.is_favorite = is_favorite;
            count += 1;
        }
        debug!(ticker, is_favorite, count, "Bulk favorite update applied");
        Ok(count)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.signals.read().await.len())
    }
}
