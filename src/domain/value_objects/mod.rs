//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`ProviderId`], [`CallerId`], [`ProxyId`]: String-based identifiers
//!
//! ## Corridor Types
//!
//! - [`Country`]: Supported destination countries
//! - [`CurrencyCode`]: ISO 4217 currency codes
//!
//! ## Time
//!
//! - [`Timestamp`]: UTC wall-clock timestamp for outbound payloads

pub mod corridor;
pub mod ids;
pub mod timestamp;

pub use corridor::{Country, CurrencyCode};
pub use ids::{CallerId, ProviderId, ProxyId};
pub use timestamp::Timestamp;
