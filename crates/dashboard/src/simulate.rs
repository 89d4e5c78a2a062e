use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use common::{NewSignal, SignalAction, SignalCategory};

use crate::backend::SignalsBackend;

const CRYPTO_TICKERS: [&str; 5] = ["BTCUSDT", "ETHUSDT", "SOLUSDT", "ADAUSDT", "DOTUSDT"];
const FOREX_TICKERS: [&str; 5] = ["EURUSD", "GBPUSD", "USDJPY", "AUDUSD", "USDCAD"];
const COMMODITY_TICKERS: [&str; 5] = ["XAUUSD", "XAGUSD", "USOIL", "UKOIL", "NATGAS"];

/// Tickers the simulator draws from for a category.
pub fn tickers_for(category: SignalCategory) -> &'static [&'static str] {
    match category {
        SignalCategory::Crypto => &CRYPTO_TICKERS,
        SignalCategory::Forex => &FOREX_TICKERS,
        SignalCategory::Commodities => &COMMODITY_TICKERS,
    }
}

/// A plausible random signal: random category, a ticker from that market,
/// a price in the market's usual range and a coin-flip action.
pub fn random_signal<R: Rng>(rng: &mut R) -> NewSignal {
    let category = SignalCategory::ALL[rng.gen_range(0..SignalCategory::ALL.len())];
    let tickers = tickers_for(category);
    let ticker = tickers[rng.gen_range(0..tickers.len())];

    let price = match category {
        SignalCategory::Crypto => round(rng.gen_range(1_000.0..71_000.0), 2),
        SignalCategory::Forex => round(rng.gen_range(0.8..2.3), 4),
        SignalCategory::Commodities => round(rng.gen_range(50.0..2_550.0), 2),
    };

    let action = if rng.gen_bool(0.5) {
        SignalAction::Buy
    } else {
        SignalAction::Sell
    };

    NewSignal::new(ticker, price, action, category)
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Submit a random signal every `every` until the task is aborted.
/// Failures are logged and the loop carries on.
pub async fn run(backend: Arc<dyn SignalsBackend>, every: Duration) {
    info!(interval_secs = every.as_secs(), "Signal simulator running");
    let mut rng = StdRng::from_entropy();
    let mut interval = tokio::time::interval(every);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let signal = random_signal(&mut rng);
        match backend.submit_signal(&signal).await {
            Ok(created) => info!(
                ticker = %created.ticker,
                action = %created.action,
                price = created.price,
                "Simulated signal ingested"
            ),
            Err(e) => warn!(ticker = %signal.ticker, error = %e, "Simulated signal rejected"),
        }
    }
}
