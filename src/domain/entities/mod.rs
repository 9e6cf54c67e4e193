//! # Domain Entities
//!
//! - [`Query`]: Normalized quote request, also the cache key
//! - [`Quote`]: One provider's transfer outcome
//! - [`ProxyRecord`]: Static egress proxy configuration

pub mod proxy;
pub mod query;
pub mod quote;

pub use proxy::{ProxyCredentials, ProxyProtocol, ProxyRecord};
pub use query::Query;
pub use quote::{Quote, QuoteBuilder};
