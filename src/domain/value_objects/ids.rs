//! # Identifiers
//!
//! String-based identifiers for providers, callers and proxies.
//!
//! # Examples
//!
//! ```
//! use remit_quote::domain::value_objects::ids::{CallerId, ProviderId};
//!
//! let provider = ProviderId::new("hanpass");
//! assert_eq!(provider.as_str(), "hanpass");
//!
//! let caller = CallerId::new("203.0.113.7");
//! assert_eq!(caller.to_string(), "203.0.113.7");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a provider adapter, unique per adapter.
    ProviderId
);

string_id!(
    /// Identity of an inbound caller (network origin) used for rate limiting.
    CallerId
);

string_id!(
    /// Identifier of an egress proxy (`host:port`).
    ProxyId
);
