use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of signals held by a store. Older entries are dropped first.
pub const MAX_SIGNALS: usize = 200;

/// Direction of a trading alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
}

impl SignalAction {
    pub const ALL: [SignalAction; 2] = [SignalAction::Buy, SignalAction::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Buy => "buy",
            SignalAction::Sell => "sell",
        }
    }
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(SignalAction::Buy),
            "sell" => Ok(SignalAction::Sell),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// Market the instrument belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalCategory {
    Crypto,
    Forex,
    Commodities,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 3] = [
        SignalCategory::Crypto,
        SignalCategory::Forex,
        SignalCategory::Commodities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalCategory::Crypto => "crypto",
            SignalCategory::Forex => "forex",
            SignalCategory::Commodities => "commodities",
        }
    }
}

impl std::fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crypto" => Ok(SignalCategory::Crypto),
            "forex" => Ok(SignalCategory::Forex),
            "commodities" => Ok(SignalCategory::Commodities),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// One buy/sell alert for a ticker at a price and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: String,
    /// Uppercase instrument symbol, e.g. "BTCUSDT".
    pub ticker: String,
    pub price: f64,
    pub time: DateTime<Utc>,
    pub action: SignalAction,
    pub category: SignalCategory,
    /// Cached per-ticker favorite state. The favorite ledger is authoritative.
    #[serde(default)]
    pub is_favorite: bool,
}

impl Signal {
    /// Case-insensitive ticker comparison used by every by-ticker operation.
    pub fn has_ticker(&self, ticker: &str) -> bool {
        self.ticker.eq_ignore_ascii_case(ticker)
    }
}

/// A validated submission, not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignal {
    pub ticker: String,
    pub price: f64,
    pub action: SignalAction,
    pub category: SignalCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl NewSignal {
    pub fn new(
        ticker: impl Into<String>,
        price: f64,
        action: SignalAction,
        category: SignalCategory,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            action,
            category,
            time: None,
            is_favorite: None,
        }
    }

    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = Some(is_favorite);
        self
    }
}

/// Normalize a ticker the way it is stored: trimmed and uppercased.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Body of both favorite PATCH endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteUpdate {
    pub is_favorite: bool,
}

/// Response of the bulk favorite endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFavoriteResult {
    pub message: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn signal_serializes_with_camel_case_and_lowercase_enums() {
        let signal = Signal {
            id: "abc".into(),
            ticker: "BTCUSDT".into(),
            price: 68500.75,
            time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            action: SignalAction::Buy,
            category: SignalCategory::Crypto,
            is_favorite: true,
        };

        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value["isFavorite"], true);
        assert_eq!(value["action"], "buy");
        assert_eq!(value["category"], "crypto");
        assert_eq!(value["time"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn signal_deserializes_without_favorite_flag() {
        let json = r#"{"id":"1","ticker":"EURUSD","price":1.085,
            "time":"2024-05-01T12:00:00Z","action":"sell","category":"forex"}"#;
        let signal: Signal = serde_json::from_str(json).unwrap();
        assert!(!signal.is_favorite);
        assert_eq!(signal.category, SignalCategory::Forex);
    }

    #[test]
    fn ticker_match_ignores_case() {
        let signal = Signal {
            id: "1".into(),
            ticker: "XAUUSD".into(),
            price: 2350.0,
            time: Utc::now(),
            action: SignalAction::Buy,
            category: SignalCategory::Commodities,
            is_favorite: false,
        };
        assert!(signal.has_ticker("xauusd"));
        assert!(!signal.has_ticker("XAGUSD"));
    }

    #[test]
    fn normalize_ticker_trims_and_uppercases() {
        assert_eq!(normalize_ticker("  solusdt "), "SOLUSDT");
    }

    #[test]
    fn enum_parsing_rejects_unknown_values() {
        assert_eq!("sell".parse::<SignalAction>(), Ok(SignalAction::Sell));
        assert!("hold".parse::<SignalAction>().is_err());
        assert_eq!(
            "commodities".parse::<SignalCategory>(),
            Ok(SignalCategory::Commodities)
        );
        assert!("stocks".parse::<SignalCategory>().is_err());
    }
}
