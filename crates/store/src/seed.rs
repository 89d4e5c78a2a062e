use chrono::{Duration, Utc};
use tracing::info;

use common::{NewSignal, Result, SignalAction, SignalCategory, SignalRepository};

/// Populate an empty store with a handful of recent demo signals.
pub async fn seed_demo_signals(store: &dyn SignalRepository) -> Result<usize> {
    let now = Utc::now();
    let demo = [
        ("BTCUSDT", 68_500.75, SignalAction::Buy, SignalCategory::Crypto, Duration::minutes(5)),
        ("ETHUSDT", 3_600.20, SignalAction::Sell, SignalCategory::Crypto, Duration::minutes(10)),
        ("SOLUSDT", 150.50, SignalAction::Buy, SignalCategory::Crypto, Duration::hours(2)),
        ("EURUSD", 1.0850, SignalAction::Sell, SignalCategory::Forex, Duration::minutes(15)),
        ("XAUUSD", 2_350.00, SignalAction::Buy, SignalCategory::Commodities, Duration::minutes(30)),
    ];

    // Appends prepend, so insert in reverse to keep the list in the order above.
    for (ticker, price, action, category, age) in demo.iter().rev() {
        store
            .append(NewSignal::new(*ticker, *price, *action, *category).at(now - *age).favorite(false))
            .await?;
    }

    info!(count = demo.len(), "Seeded demo signals");
    Ok(demo.len())
}
