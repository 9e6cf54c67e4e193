//! # Application Errors
//!
//! Outcomes of a quote request that are reported to the caller.
//!
//! ```text
//! ApplicationError
//! ├── Validation(String)     - malformed or unsupported query
//! ├── RateLimited            - caller exceeded its window
//! ├── NoProvidersAvailable   - aggregation finished with zero quotes
//! ├── RequestTimedOut        - global deadline hit with zero quotes
//! └── Internal(String)       - unexpected failure inside the engine
//! ```
//!
//! Provider failures never appear here; the engine discards them.
//!
//! # Examples
//!
//! ```
//! use remit_quote::application::error::ApplicationError;
//! use remit_quote::domain::errors::DomainError;
//!
//! let err: ApplicationError = DomainError::UnsupportedCountry("mars".into()).into();
//! assert!(err.is_client_error());
//! ```

use crate::domain::errors::DomainError;
use std::time::Duration;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// Request validation failed.
    #[error("Invalid country or currency code: {0}")]
    Validation(String),

    /// Caller exceeded its rate limit.
    #[error("Too many requests. Please slow down.")]
    RateLimited {
        /// Time until the oldest request leaves the window.
        retry_after: Duration,
    },

    /// Every provider failed or returned nothing.
    #[error("No remittance providers available for the selected country.")]
    NoProvidersAvailable,

    /// Global deadline elapsed before any provider answered.
    #[error("Request timed out. Please try again later.")]
    RequestTimedOut,

    /// Unexpected failure inside the engine.
    #[error("Failed to retrieve remittance data: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if the caller can fix the request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::RateLimited { .. })
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::NoProvidersAvailable => "NO_PROVIDERS_AVAILABLE",
            Self::RequestTimedOut => "REQUEST_TIMED_OUT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        Self::Validation(error.to_string())
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_become_validation() {
        let err: ApplicationError = DomainError::InvalidAmount("0".into()).into();
        assert_eq!(err.code(), "VALIDATION");
        assert!(err.to_string().contains("invalid amount"));
    }

    #[test]
    fn aggregation_outcomes_are_distinct() {
        assert_ne!(
            ApplicationError::NoProvidersAvailable.code(),
            ApplicationError::RequestTimedOut.code()
        );
        assert!(!ApplicationError::RequestTimedOut.is_client_error());
        assert!(
            ApplicationError::RateLimited {
                retry_after: Duration::from_secs(3)
            }
            .is_client_error()
        );
    }
}
