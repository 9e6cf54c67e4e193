//! # Quote Entity
//!
//! Represents one provider's computed transfer outcome for a [`Query`].
//!
//! A quote is built by a provider adapter at the end of a successful parse
//! and is immutable afterwards. Construction validates the amounts, so a
//! quote with a non-positive `recipient_gets` cannot exist.
//!
//! # Examples
//!
//! ```
//! use remit_quote::domain::entities::quote::Quote;
//! use remit_quote::domain::value_objects::ProviderId;
//! use rust_decimal::Decimal;
//!
//! let quote = Quote::builder(
//!     ProviderId::new("hanpass"),
//!     Decimal::new(185, 1),
//!     Decimal::from(5000),
//!     Decimal::from(18_407_500),
//! )
//! .transfer_method("Bank Transfer")
//! .link("https://www.hanpass.com/")
//! .build()
//! .unwrap();
//!
//! assert_eq!(quote.provider().as_str(), "hanpass");
//! ```
//!
//! [`Query`]: crate::domain::entities::query::Query

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::ProviderId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places kept on derived recipient amounts.
pub const RECIPIENT_SCALE: u32 = 2;

/// A transfer quote from one provider.
///
/// # Invariants
///
/// - `exchange_rate` is positive (destination units per send unit)
/// - `fee` is non-negative, in send-currency units
/// - `recipient_gets` is positive, in final destination-currency units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuoteParts")]
pub struct Quote {
    provider: ProviderId,
    #[serde(with = "rust_decimal::serde::float")]
    exchange_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    recipient_gets: Decimal,
    transfer_method: Option<String>,
    link: String,
}

/// Unvalidated wire form used to route deserialization through [`Quote::new`].
#[derive(Deserialize)]
struct QuoteParts {
    provider: ProviderId,
    #[serde(with = "rust_decimal::serde::float")]
    exchange_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    recipient_gets: Decimal,
    #[serde(default)]
    transfer_method: Option<String>,
    #[serde(default)]
    link: String,
}

impl TryFrom<QuoteParts> for Quote {
    type Error = DomainError;

    fn try_from(parts: QuoteParts) -> Result<Self, Self::Error> {
        let mut quote = Quote::new(
            parts.provider,
            parts.exchange_rate,
            parts.fee,
            parts.recipient_gets,
        )?;
        quote.transfer_method = parts.transfer_method;
        quote.link = parts.link;
        Ok(quote)
    }
}

impl Quote {
    /// Creates a new quote with validation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidExchangeRate` if the rate is not positive.
    /// Returns `DomainError::InvalidFee` if the fee is negative.
    /// Returns `DomainError::InvalidRecipientAmount` if `recipient_gets` is not
    /// positive.
    pub fn new(
        provider: ProviderId,
        exchange_rate: Decimal,
        fee: Decimal,
        recipient_gets: Decimal,
    ) -> DomainResult<Self> {
        if exchange_rate <= Decimal::ZERO {
            return Err(DomainError::InvalidExchangeRate(exchange_rate.to_string()));
        }
        if fee < Decimal::ZERO {
            return Err(DomainError::InvalidFee(fee.to_string()));
        }
        if recipient_gets <= Decimal::ZERO {
            return Err(DomainError::InvalidRecipientAmount(
                recipient_gets.to_string(),
            ));
        }

        Ok(Self {
            provider,
            exchange_rate,
            fee,
            recipient_gets,
            transfer_method: None,
            link: String::new(),
        })
    }

    /// Returns a builder for constructing a quote.
    #[must_use]
    pub fn builder(
        provider: ProviderId,
        exchange_rate: Decimal,
        fee: Decimal,
        recipient_gets: Decimal,
    ) -> QuoteBuilder {
        QuoteBuilder::new(provider, exchange_rate, fee, recipient_gets)
    }

    /// Computes `(send_amount - fee) * exchange_rate`, rounded to
    /// [`RECIPIENT_SCALE`] places.
    ///
    /// Used by providers that do not report the recipient amount themselves.
    /// Returns `None` when the arithmetic overflows.
    ///
    /// # Examples
    ///
    /// ```
    /// use remit_quote::domain::entities::quote::Quote;
    /// use rust_decimal::Decimal;
    ///
    /// let gets = Quote::derive_recipient_gets(
    ///     Decimal::from(1_000_000),
    ///     Decimal::from(5_000),
    ///     Decimal::new(185, 1),
    /// );
    /// assert_eq!(gets, Some(Decimal::from(18_407_500)));
    /// ```
    #[must_use]
    pub fn derive_recipient_gets(
        send_amount: Decimal,
        fee: Decimal,
        exchange_rate: Decimal,
    ) -> Option<Decimal> {
        send_amount
            .checked_sub(fee)?
            .checked_mul(exchange_rate)
            .map(|gets| gets.round_dp(RECIPIENT_SCALE))
    }

    /// Returns the provider that produced this quote.
    #[inline]
    #[must_use]
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Returns the exchange rate.
    #[inline]
    #[must_use]
    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    /// Returns the fee in send-currency units.
    #[inline]
    #[must_use]
    pub fn fee(&self) -> Decimal {
        self.fee
    }

    /// Returns the amount the recipient receives.
    #[inline]
    #[must_use]
    pub fn recipient_gets(&self) -> Decimal {
        self.recipient_gets
    }

    /// Returns the transfer method, if reported.
    #[inline]
    #[must_use]
    pub fn transfer_method(&self) -> Option<&str> {
        self.transfer_method.as_deref()
    }

    /// Returns the informational provider link.
    #[inline]
    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quote({} gets {} @ {} fee {})",
            self.provider, self.recipient_gets, self.exchange_rate, self.fee
        )
    }
}

/// Builder for constructing [`Quote`] instances.
#[derive(Debug, Clone)]
pub struct QuoteBuilder {
    provider: ProviderId,
    exchange_rate: Decimal,
    fee: Decimal,
    recipient_gets: Decimal,
    transfer_method: Option<String>,
    link: String,
}

impl QuoteBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(
        provider: ProviderId,
        exchange_rate: Decimal,
        fee: Decimal,
        recipient_gets: Decimal,
    ) -> Self {
        Self {
            provider,
            exchange_rate,
            fee,
            recipient_gets,
            transfer_method: None,
            link: String::new(),
        }
    }

    /// Sets the transfer method.
    #[must_use]
    pub fn transfer_method(mut self, method: impl Into<String>) -> Self {
        self.transfer_method = Some(method.into());
        self
    }

    /// Sets the provider link.
    #[must_use]
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Builds the quote.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Quote::new`].
    pub fn build(self) -> DomainResult<Quote> {
        let mut quote = Quote::new(
            self.provider,
            self.exchange_rate,
            self.fee,
            self.recipient_gets,
        )?;
        quote.transfer_method = self.transfer_method;
        quote.link = self.link;
        Ok(quote)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn provider() -> ProviderId {
        ProviderId::new("test")
    }

    #[test]
    fn new_rejects_non_positive_recipient_amount() {
        let zero = Quote::new(provider(), Decimal::ONE, Decimal::ZERO, Decimal::ZERO);
        assert!(matches!(zero, Err(DomainError::InvalidRecipientAmount(_))));

        let negative = Quote::new(provider(), Decimal::ONE, Decimal::ZERO, Decimal::from(-1));
        assert!(matches!(negative, Err(DomainError::InvalidRecipientAmount(_))));
    }

    #[test]
    fn new_rejects_bad_rate_and_fee() {
        let rate = Quote::new(provider(), Decimal::ZERO, Decimal::ZERO, Decimal::ONE);
        assert!(matches!(rate, Err(DomainError::InvalidExchangeRate(_))));

        let fee = Quote::new(provider(), Decimal::ONE, Decimal::from(-1), Decimal::ONE);
        assert!(matches!(fee, Err(DomainError::InvalidFee(_))));
    }

    #[test]
    fn derive_rounds_to_two_places() {
        let gets = Quote::derive_recipient_gets(
            Decimal::from(1000),
            Decimal::from(1),
            Decimal::new(12_345, 4),
        );
        assert_eq!(gets, Some(Decimal::new(123_326, 2)));
    }

    #[test]
    fn derive_overflow_is_none() {
        let gets = Quote::derive_recipient_gets(Decimal::from(1_000_000), Decimal::ZERO, Decimal::MAX);
        assert_eq!(gets, None);

        let gets = Quote::derive_recipient_gets(Decimal::MIN, Decimal::MAX, Decimal::ONE);
        assert_eq!(gets, None);
    }

    #[test]
    fn serializes_amounts_as_numbers() {
        let quote = Quote::builder(
            provider(),
            Decimal::new(185, 1),
            Decimal::from(5000),
            Decimal::from(18_407_500),
        )
        .link("https://example.com")
        .build()
        .unwrap();

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["provider"], "test");
        assert_eq!(json["recipient_gets"], 18_407_500.0);
        assert_eq!(json["exchange_rate"], 18.5);
        assert!(json["transfer_method"].is_null());
    }

    #[test]
    fn deserialize_enforces_invariants() {
        let bad = r#"{"provider":"x","exchange_rate":1.0,"fee":0.0,"recipient_gets":0.0}"#;
        assert!(serde_json::from_str::<Quote>(bad).is_err());

        let good = r#"{"provider":"x","exchange_rate":1.0,"fee":0.0,"recipient_gets":10.0}"#;
        let quote: Quote = serde_json::from_str(good).unwrap();
        assert_eq!(quote.recipient_gets(), Decimal::from(10));
    }
}
