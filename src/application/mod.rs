//! # Application Layer
//!
//! Orchestration on top of the domain.
//!
//! - [`services`]: aggregation engine, ranking, rate limiting, caching
//! - [`use_cases`]: the quote request flow
//! - [`dto`]: request and response shapes
//! - [`error`]: errors reported to callers

pub mod dto;
pub mod error;
pub mod services;
pub mod use_cases;

pub use dto::{AggregatedResponse, QuoteRequest};
pub use error::{ApplicationError, ApplicationResult};
