//! # remit-quote
//!
//! Remittance quote aggregation engine.
//!
//! Compares money-transfer quotes from independent upstream providers and
//! returns them ranked by the amount the recipient receives.
//!
//! # Architecture
//!
//! - [`domain`]: queries, quotes, proxies and their validation
//! - [`application`]: aggregation engine, ranking, rate limiting, caching
//! - [`infrastructure`]: provider adapters, proxy pool, configuration
//! - [`api`]: REST surface
//!
//! # Request Flow
//!
//! ```text
//! caller ─▶ RateLimiter ─▶ ResultCache ─hit─▶ response
//!                              │miss
//!                              ▼
//!                   QuoteAggregationEngine
//!              ┌──────────┬────┴─────┬──────────┐
//!              ▼          ▼          ▼          ▼
//!          adapter₁   adapter₂   adapter₃   adapterₙ  (each via ProxyPool)
//!              └──────────┴────┬─────┴──────────┘
//!                              ▼
//!                 ranked quotes ─▶ cache ─▶ response
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
