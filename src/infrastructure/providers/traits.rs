//! # Provider Adapter Trait
//!
//! Port definition for money-transfer provider integrations.
//!
//! Every upstream service is reached through a [`ProviderAdapter`]. An
//! adapter owns its wire protocol and any rate normalization, and reports
//! either a validated [`Quote`] or a [`ProviderError`](super::error::ProviderError).
//! Adapters share no mutable state with each other or with the engine.
//!
//! # Examples
//!
//! ```
//! use async_trait::async_trait;
//! use remit_quote::domain::entities::{Query, Quote};
//! use remit_quote::domain::value_objects::ProviderId;
//! use remit_quote::infrastructure::providers::error::ProviderResult;
//! use remit_quote::infrastructure::providers::payload::recipient_gets;
//! use remit_quote::infrastructure::providers::traits::ProviderAdapter;
//! use rust_decimal::Decimal;
//!
//! #[derive(Debug)]
//! struct FlatRate {
//!     id: ProviderId,
//! }
//!
//! #[async_trait]
//! impl ProviderAdapter for FlatRate {
//!     fn provider_id(&self) -> &ProviderId {
//!         &self.id
//!     }
//!
//!     async fn quote(&self, query: &Query) -> ProviderResult<Quote> {
//!         let rate = Decimal::from(18);
//!         let gets = recipient_gets(query.send_amount_decimal(), Decimal::ZERO, rate)?;
//!         Ok(Quote::new(self.id.clone(), rate, Decimal::ZERO, gets)?)
//!     }
//! }
//! ```

use crate::domain::entities::{Query, Quote};
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::error::ProviderResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Trait for provider adapters.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + fmt::Debug {
    /// Returns the provider identifier.
    fn provider_id(&self) -> &ProviderId;

    /// Returns true if this provider serves the query's corridor.
    ///
    /// The engine still calls [`quote`](Self::quote) for every adapter; the
    /// adapter is expected to fail fast with `UnsupportedCorridor` when this
    /// returns false.
    fn supports(&self, _query: &Query) -> bool {
        true
    }

    /// Requests a quote.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` for any network failure, non-success
    /// status, unsupported corridor or unparseable payload.
    async fn quote(&self, query: &Query) -> ProviderResult<Quote>;
}

/// Source of the adapters an aggregation fans out to.
#[async_trait]
pub trait ProviderRegistry: Send + Sync + fmt::Debug {
    /// Returns the adapters to query, in registration order.
    async fn available_providers(&self) -> Vec<Arc<dyn ProviderAdapter>>;
}
