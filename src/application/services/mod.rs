//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! This module provides application-level services including:
//! - [`QuoteAggregationEngine`]: Concurrent quote collection and ranking
//! - [`RankingStrategy`]: Strategies for ranking quotes
//! - [`RateLimiter`]: Per-caller sliding-window admission
//! - [`ResultCache`]: TTL memoization of aggregated responses

pub mod quote_aggregation;
pub mod ranking_strategy;
pub mod rate_limiter;
pub mod result_cache;

pub use quote_aggregation::{
    AggregationConfig, AggregationError, AggregationResult, QuoteAggregationEngine,
};
pub use ranking_strategy::{RankingStrategy, RecipientGetsStrategy};
pub use rate_limiter::{Admission, RateLimiter, RateLimiterConfig};
pub use result_cache::{CacheStats, ResultCache, ResultCacheConfig};
