//! # Provider Errors
//!
//! Error types for provider adapter calls.
//!
//! Every failure inside an adapter surfaces as a [`ProviderError`]; the
//! aggregation engine discards them as a typed branch and never propagates
//! them to the caller.
//!
//! # Examples
//!
//! ```
//! use remit_quote::infrastructure::providers::error::ProviderError;
//!
//! let error = ProviderError::timeout("no response after 2000ms");
//! assert!(error.is_transport_failure());
//!
//! let error = ProviderError::protocol_error("missing exchangeRate");
//! assert!(!error.is_transport_failure());
//! ```

use crate::domain::errors::DomainError;
use thiserror::Error;

/// Error type for provider adapter operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Request timed out.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Upstream answered with a non-success status.
    #[error("provider returned HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Error message or truncated body.
        message: String,
    },

    /// Upstream rate limit hit.
    #[error("provider rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
    },

    /// Response could not be parsed.
    #[error("provider protocol error: {message}")]
    ProtocolError {
        /// Error message.
        message: String,
    },

    /// Upstream reported a business-level rejection.
    #[error("provider rejected quote: {message}")]
    Rejected {
        /// Provider-specific result code, when reported.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// The provider does not serve this destination or currency.
    #[error("provider does not support {corridor}")]
    UnsupportedCorridor {
        /// The corridor as `country:currency`.
        corridor: String,
    },

    /// Parsed values do not form a valid quote.
    #[error("provider returned invalid quote: {0}")]
    InvalidQuote(#[from] DomainError),

    /// Internal adapter error.
    #[error("provider internal error: {message}")]
    InternalError {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol_error(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    /// Creates a rejection error with an optional provider result code.
    #[must_use]
    pub fn rejected(code: Option<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    /// Creates an unsupported corridor error.
    #[must_use]
    pub fn unsupported(corridor: impl Into<String>) -> Self {
        Self::UnsupportedCorridor {
            corridor: corridor.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Returns true if the failure happened on the wire.
    ///
    /// Only transport failures count against the proxy that carried the
    /// request; a response that arrived but could not be parsed says
    /// nothing about proxy health.
    #[must_use]
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Connection { .. }
                | Self::RateLimited { .. }
                | Self::HttpStatus { .. }
        )
    }

    /// Returns the provider result code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
