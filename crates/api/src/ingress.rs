//! Validation of inbound webhook payloads and favorite PATCH bodies.
//!
//! Payloads are checked field by field from a raw JSON value so that every
//! problem is reported at once, keyed by field name.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use common::{
    normalize_ticker, Error, FavoriteUpdate, FieldErrors, NewSignal, Result, SignalAction,
    SignalCategory,
};

/// Validate a webhook payload into a `NewSignal` with a normalized ticker.
///
/// `time` and `isFavorite` stay `None` when absent; the caller resolves them.
pub fn validate_submission(body: &Value) -> Result<NewSignal> {
    let Some(obj) = body.as_object() else {
        return Err(Error::field("body", "Expected a JSON object"));
    };

    let mut errors = FieldErrors::new();

    let ticker = match obj.get("ticker") {
        None | Some(Value::Null) => reject(&mut errors, "ticker", "Ticker is required"),
        Some(Value::String(s)) if s.trim().is_empty() => {
            reject(&mut errors, "ticker", "Ticker is required")
        }
        Some(Value::String(s)) => Some(normalize_ticker(s)),
        Some(_) => reject(&mut errors, "ticker", "Ticker must be a string"),
    };

    let price = match obj.get("price") {
        None | Some(Value::Null) => reject(&mut errors, "price", "Price is required"),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(p) if p.is_finite() && p > 0.0 => Some(p),
            _ => reject(&mut errors, "price", "Price must be positive"),
        },
        Some(_) => reject(&mut errors, "price", "Price must be a number"),
    };

    let action = match obj.get("action").and_then(Value::as_str) {
        Some(s) => s.parse::<SignalAction>().ok(),
        None => None,
    };
    let action = action.or_else(|| reject(&mut errors, "action", "Action must be 'buy' or 'sell'"));

    let category = match obj.get("category").and_then(Value::as_str) {
        Some(s) => s.parse::<SignalCategory>().ok(),
        None => None,
    };
    let category = category.or_else(|| {
        reject(
            &mut errors,
            "category",
            "Category must be 'crypto', 'forex', or 'commodities'",
        )
    });

    let time = match optional(obj, "time") {
        None => None,
        Some(Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(_) => reject(&mut errors, "time", "Invalid datetime format"),
        },
        Some(_) => reject(&mut errors, "time", "Invalid datetime format"),
    };

    let is_favorite = match optional(obj, "isFavorite") {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => reject(&mut errors, "isFavorite", "isFavorite must be a boolean"),
    };

    match (ticker, price, action, category) {
        (Some(ticker), Some(price), Some(action), Some(category)) if errors.is_empty() => {
            Ok(NewSignal {
                ticker,
                price,
                action,
                category,
                time,
                is_favorite,
            })
        }
        _ => Err(Error::Validation(errors)),
    }
}

/// Validate the `{isFavorite: bool}` body of both favorite endpoints.
pub fn validate_favorite_update(body: &Value) -> Result<FavoriteUpdate> {
    match body.get("isFavorite") {
        Some(Value::Bool(is_favorite)) => Ok(FavoriteUpdate {
            is_favorite: *is_favorite,
        }),
        None | Some(Value::Null) => Err(Error::field("isFavorite", "isFavorite is required")),
        Some(_) => Err(Error::field("isFavorite", "isFavorite must be a boolean")),
    }
}

/// Parse a raw request body as JSON.
pub fn parse_json(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|_| Error::InvalidJson)
}

/// An optional field; explicit `null` counts as absent.
fn optional<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn reject<T>(errors: &mut FieldErrors, field: &str, message: &str) -> Option<T> {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
    None
}
