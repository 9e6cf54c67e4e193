//! # Domain Errors
//!
//! Error types raised while constructing or validating domain objects.
//!
//! # Examples
//!
//! ```
//! use remit_quote::domain::errors::DomainError;
//!
//! let err = DomainError::UnsupportedCountry("atlantis".to_string());
//! assert!(err.to_string().contains("atlantis"));
//! ```

use thiserror::Error;

/// Error type for domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Destination country is not in the supported set.
    #[error("unsupported country: {0}")]
    UnsupportedCountry(String),

    /// Currency code is not a 3-letter ISO code.
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Country and currency do not form a supported corridor.
    #[error("unsupported currency {currency} for {country}")]
    UnsupportedCorridor {
        /// Destination country.
        country: String,
        /// Requested destination currency.
        currency: String,
    },

    /// Send amount is zero or negative.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Exchange rate is not positive.
    #[error("invalid exchange rate: {0}")]
    InvalidExchangeRate(String),

    /// Fee is negative.
    #[error("invalid fee: {0}")]
    InvalidFee(String),

    /// Recipient amount is not positive.
    #[error("invalid recipient amount: {0}")]
    InvalidRecipientAmount(String),

    /// Proxy specification could not be parsed.
    #[error("invalid proxy: {0}")]
    InvalidProxy(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
