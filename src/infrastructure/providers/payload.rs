//! Helpers for pulling numbers out of loosely typed upstream JSON.
//!
//! Upstreams report amounts as JSON numbers, plain strings, or strings with
//! thousands separators (`"1,234.50"`).

use crate::domain::entities::Quote;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Parses a JSON number or numeric string into a `Decimal`.
#[must_use]
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_str(&n.to_string()),
        Value::String(s) => parse_str(s),
        _ => None,
    }
}

fn parse_str(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
}

/// Reads a required decimal field.
///
/// # Errors
///
/// Returns `ProviderError::ProtocolError` if the field is absent or not
/// numeric.
pub fn required_decimal(body: &Value, field: &str) -> ProviderResult<Decimal> {
    body.get(field)
        .and_then(to_decimal)
        .ok_or_else(|| ProviderError::protocol_error(format!("missing or invalid '{}'", field)))
}

/// Reads an optional decimal field; absent, null or empty yields zero.
///
/// # Errors
///
/// Returns `ProviderError::ProtocolError` if the field is present but not
/// numeric.
pub fn decimal_or_zero(body: &Value, field: &str) -> ProviderResult<Decimal> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(Decimal::ZERO),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Decimal::ZERO),
        Some(value) => to_decimal(value)
            .ok_or_else(|| ProviderError::protocol_error(format!("invalid '{}'", field))),
    }
}

/// Derives the recipient amount from upstream numbers.
///
/// # Errors
///
/// Returns `ProviderError::ProtocolError` if the upstream values overflow
/// the decimal range.
pub fn recipient_gets(send_amount: Decimal, fee: Decimal, exchange_rate: Decimal) -> ProviderResult<Decimal> {
    Quote::derive_recipient_gets(send_amount, fee, exchange_rate).ok_or_else(|| {
        ProviderError::protocol_error(format!(
            "recipient amount out of range for rate {}",
            exchange_rate
        ))
    })
}
