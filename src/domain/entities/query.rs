//! # Query Entity
//!
//! Normalized quote request used as the cache key and as the argument for
//! every provider invocation.
//!
//! # Examples
//!
//! ```
//! use remit_quote::domain::entities::query::Query;
//! use remit_quote::domain::value_objects::corridor::Country;
//!
//! let query = Query::parse("Vietnam", "vnd", 1_000_000).unwrap();
//! assert_eq!(query.country(), Country::Vietnam);
//! assert_eq!(query.currency().as_str(), "VND");
//! assert_eq!(query.to_string(), "vietnam:VND:1000000:KRW");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::corridor::{Country, CurrencyCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized remittance quote request.
///
/// # Invariants
///
/// - `country` is one of the supported destinations
/// - `currency` is supported for `country`
/// - `send_amount` is strictly positive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    country: Country,
    currency: CurrencyCode,
    send_amount: u64,
    send_currency: CurrencyCode,
}

impl Query {
    /// Creates a query from already-typed parts, using the default send
    /// currency.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if `send_amount` is zero.
    /// Returns `DomainError::UnsupportedCorridor` if the currency is not
    /// accepted for the country.
    pub fn new(country: Country, currency: CurrencyCode, send_amount: u64) -> DomainResult<Self> {
        if send_amount == 0 {
            return Err(DomainError::InvalidAmount(
                "send amount must be positive".to_string(),
            ));
        }
        if !country.supports_currency(&currency) {
            return Err(DomainError::UnsupportedCorridor {
                country: country.key().to_string(),
                currency: currency.to_string(),
            });
        }

        Ok(Self {
            country,
            currency,
            send_amount,
            send_currency: CurrencyCode::KRW,
        })
    }

    /// Parses raw request parameters into a normalized query.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the country is unknown, the currency is
    /// malformed or unsupported for the country, or the amount is not
    /// positive.
    pub fn parse(country: &str, currency: &str, send_amount: i64) -> DomainResult<Self> {
        let country: Country = country.parse()?;
        let currency = CurrencyCode::new(currency)?;
        let send_amount = u64::try_from(send_amount)
            .map_err(|_| DomainError::InvalidAmount(send_amount.to_string()))?;
        Self::new(country, currency, send_amount)
    }

    /// Overrides the send currency.
    ///
    /// Only KRW is accepted by the providers today, so callers normally
    /// leave the default in place.
    #[must_use]
    pub fn with_send_currency(mut self, send_currency: CurrencyCode) -> Self {
        self.send_currency = send_currency;
        self
    }

    /// Returns the destination country.
    #[inline]
    #[must_use]
    pub fn country(&self) -> Country {
        self.country
    }

    /// Returns the destination currency.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Returns the send amount in send-currency units.
    #[inline]
    #[must_use]
    pub fn send_amount(&self) -> u64 {
        self.send_amount
    }

    /// Returns the send amount as a decimal for rate arithmetic.
    #[must_use]
    pub fn send_amount_decimal(&self) -> Decimal {
        Decimal::from(self.send_amount)
    }

    /// Returns the send currency.
    #[inline]
    #[must_use]
    pub fn send_currency(&self) -> CurrencyCode {
        self.send_currency
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.country, self.currency, self.send_amount, self.send_currency
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case() {
        let a = Query::parse("VIETNAM", "vnd", 500_000).unwrap();
        let b = Query::parse("vietnam", "VND", 500_000).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.send_currency(), CurrencyCode::KRW);
    }

    #[test]
    fn parse_rejects_non_positive_amount() {
        assert!(matches!(
            Query::parse("nepal", "NPR", 0),
            Err(DomainError::InvalidAmount(_))
        ));
        assert!(matches!(
            Query::parse("nepal", "NPR", -5),
            Err(DomainError::InvalidAmount(_))
        ));
    }

    #[test]
    fn parse_rejects_unsupported_corridor() {
        let err = Query::parse("thailand", "VND", 1000).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedCorridor { .. }));
    }

    #[test]
    fn parse_rejects_unknown_country() {
        let err = Query::parse("narnia", "USD", 1000).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedCountry(_)));
    }

    #[test]
    fn usd_is_accepted_everywhere() {
        let query = Query::parse("mongolia", "usd", 1000).unwrap();
        assert_eq!(query.currency(), CurrencyCode::USD);
    }
}
